//! The annotation value model and the resolved metadata types.
//!
//! [`AnnotationValue`] is one resolved annotation occurrence;
//! [`MutableAnnotationMetadata`] accumulates occurrences during a build;
//! [`AnnotationMetadata`] is the immutable, queryable result handed to
//! downstream consumers.

pub mod src;

pub use src::api::AnnotationMetadata;
pub use src::hierarchy::AnnotationMetadataHierarchy;
pub use src::mutable::MutableAnnotationMetadata;
pub use src::value::{AnnotationValue, AnnotationValueBuilder, MemberValue, RetentionPolicy};
