//! The resolution engine.
//!
//! [`MetadataBuilder`] orchestrates a build request: it flattens the type
//! hierarchy (ancestors first, so descendants override), extracts raw
//! annotations per level, and runs each through the per-annotation
//! pipeline: alias resolution, stereotype expansion with cycle guarding,
//! cached default resolution, the Mapper -> Remapper -> Transformer chain,
//! and repeatable-container flattening.

pub mod src;

pub use src::config::{
    BuilderConfig, ExcludedStereotypes, NullabilityRule, ALIASES, ALIAS_ANNOTATION, ALIAS_FOR,
    ALIAS_MEMBER, DEFAULT_SCOPE, INHERITED, SCOPE, VALUE_MEMBER,
};
pub use src::context::ProcessingContext;
pub use src::engine::MetadataBuilder;
pub use src::validation::{is_unresolved_placeholder, AnnotatedElementValidator};
