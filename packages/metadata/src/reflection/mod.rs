//! Element abstraction: a read-only facade over a compiler-specific
//! annotated program element model.
//!
//! The engine sees elements only through the [`ReflectionHost`] trait; a
//! host adapter is implemented once per compiler frontend. The
//! [`InMemoryReflectionHost`] is a programmatic model used by tests and by
//! embedders that synthesize elements.

pub mod src;

pub use src::api::{
    AnnotationDeclaration, ElementId, ElementKind, HostError, MemberDeclaration, RawAnnotation,
    ReflectionHost,
};
pub use src::memory::{ElementRegistration, InMemoryReflectionHost};

#[cfg(test)]
mod test;
