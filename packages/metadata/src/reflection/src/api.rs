use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{MemberValue, RetentionPolicy};

/// Identity of a program element, stable for the lifetime of a compilation
/// unit. Used directly as a cache key and inside composite keys.
///
/// The textual form is host-defined; the conventional shape is
/// `"com.app.Controller"` for types and `"com.app.Controller::index()"` for
/// members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of element kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Class,
    Method,
    Constructor,
    Field,
    Parameter,
}

/// An annotation occurrence exactly as the host compiler reports it.
///
/// The host is responsible for unwrapping compiler-native repeatable sugar:
/// a container written as `@Parent({@Child, @Child})` in source must arrive
/// here as two `Child` occurrences, not one `Parent`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub type_name: String,
    /// Member values in declaration order.
    pub values: IndexMap<String, MemberValue>,
}

impl RawAnnotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            values: IndexMap::new(),
        }
    }

    pub fn member(mut self, name: impl Into<String>, value: impl Into<MemberValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

/// One member of an annotation type's declaration.
#[derive(Debug, Clone, Default)]
pub struct MemberDeclaration {
    pub name: String,
    pub default_value: Option<MemberValue>,
    /// Annotations on the member itself. Alias markers and validation
    /// constraints both live here.
    pub annotations: Vec<RawAnnotation>,
}

impl MemberDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn default_value(mut self, value: impl Into<MemberValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn annotated(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Declaration-level view of an annotation type, as resolvable on the
/// compilation classpath.
#[derive(Debug, Clone, Default)]
pub struct AnnotationDeclaration {
    pub name: String,
    pub retention: RetentionPolicy,
    pub members: Vec<MemberDeclaration>,
    /// Meta-annotations on the declaration itself, in declaration order.
    pub annotations: Vec<RawAnnotation>,
    /// The container annotation type name when this annotation is repeatable.
    pub repeatable_container: Option<String>,
}

impl AnnotationDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retention: RetentionPolicy::default(),
            ..Self::default()
        }
    }

    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn member(mut self, member: MemberDeclaration) -> Self {
        self.members.push(member);
        self
    }

    pub fn annotated(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn repeatable(mut self, container: impl Into<String>) -> Self {
        self.repeatable_container = Some(container.into());
        self
    }

    pub fn member_declaration(&self, name: &str) -> Option<&MemberDeclaration> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Failure reported by a [`ReflectionHost`].
///
/// `Recoverable` corresponds to the host toolchain's known per-element abort
/// condition; the engine converts it into empty metadata for that element so
/// the rest of the compilation proceeds. Any other failure is `Fatal` and
/// propagates unmodified.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("recoverable host failure: {0}")]
    Recoverable(String),
    #[error("unrecoverable host failure: {0}")]
    Fatal(String),
}

/// Read-only facade over a compiler-specific annotated program element
/// model. Implemented once per host compiler frontend (a Java annotation
/// processor, a Kotlin symbol-processing frontend, the in-memory model in
/// this crate).
pub trait ReflectionHost {
    /// Annotations physically present on `element`, in declaration order,
    /// with repeatable sugar already unwrapped.
    fn annotations_of(&self, element: &ElementId) -> Result<Vec<RawAnnotation>, HostError>;

    /// The element itself first, then its supertype/override chain.
    /// `declared_only` yields just `[element]`; `inherit_type_annotations`
    /// controls whether a type contributes its supertypes at all.
    fn type_hierarchy_of(
        &self,
        element: &ElementId,
        inherit_type_annotations: bool,
        declared_only: bool,
    ) -> Result<Vec<ElementId>, HostError>;

    fn element_kind(&self, element: &ElementId) -> ElementKind;

    /// Declaration-level info for an annotation type, or `None` when the
    /// type is not resolvable on the compilation classpath.
    fn annotation_declaration(&self, type_name: &str) -> Option<AnnotationDeclaration>;
}
