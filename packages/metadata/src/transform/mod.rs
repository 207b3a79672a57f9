//! Pluggable annotation extensions.
//!
//! Three extension points run, in order, over every extracted annotation
//! value: Mappers (additive), Remappers (substitutive, package-scoped),
//! Transformers (substitutive, type-scoped). Implementations are collected
//! into an [`ExtensionRegistry`] by the embedding frontend; the resolution
//! engine only consumes an already-populated registry.

pub mod src;

pub use src::api::{
    AnnotationMapper, AnnotationRemapper, AnnotationTransformer, ALL_PACKAGES,
};
pub use src::registry::{package_of, ExtensionRegistry, ExtensionRegistryBuilder};
