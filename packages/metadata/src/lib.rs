#![deny(clippy::all)]

//! Compile-time annotation metadata resolution.
//!
//! Given a queryable source element (via a [`reflection::ReflectionHost`])
//! this crate computes a fused, normalized [`metadata::AnnotationMetadata`]
//! view of every annotation that applies to it: inherited annotations,
//! meta-annotations ("stereotypes"), aliased members, repeatable-annotation
//! containers, and values contributed by pluggable mapping, transformation
//! and remapping extensions.
//!
//! The embedding compiler frontend supplies the element model and drives
//! the lifecycle; this crate is synchronous, CPU-bound and host-agnostic.

pub mod diagnostics;
pub mod incremental;
pub mod metadata;
pub mod reflection;
pub mod resolution;
pub mod transform;

pub use diagnostics::{Diagnostic, DiagnosticSink, ErrorCode, MetadataError};
pub use incremental::{MetadataKey, MetadataSession};
pub use metadata::{
    AnnotationMetadata, AnnotationMetadataHierarchy, AnnotationValue, MemberValue, RetentionPolicy,
};
pub use reflection::{ElementId, ElementKind, RawAnnotation, ReflectionHost};
pub use resolution::{BuilderConfig, MetadataBuilder};
pub use transform::{
    AnnotationMapper, AnnotationRemapper, AnnotationTransformer, ExtensionRegistry,
};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
