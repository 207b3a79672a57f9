use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether an annotation is retained past compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Discarded after the compilation unit that saw it.
    Source,
    /// Retained in compiled output but not exposed at runtime.
    Class,
    /// Retained and queryable at runtime.
    #[default]
    Runtime,
}

/// A resolved annotation member value.
///
/// Class references stay symbolic (`Class`) because the referenced type may
/// not be compiled yet when the value is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MemberValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Enum {
        type_name: String,
        variant: String,
    },
    /// A class-reference placeholder holding the fully qualified type name.
    Class(String),
    Annotation(Box<AnnotationValue>),
    Array(Vec<MemberValue>),
}

impl MemberValue {
    pub fn string(value: impl Into<String>) -> Self {
        MemberValue::String(value.into())
    }

    pub fn class(type_name: impl Into<String>) -> Self {
        MemberValue::Class(type_name.into())
    }

    pub fn annotation(value: AnnotationValue) -> Self {
        MemberValue::Annotation(Box::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MemberValue::String(s) => Some(s),
            MemberValue::Class(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for MemberValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MemberValue::Bool(a), MemberValue::Bool(b)) => a == b,
            (MemberValue::Int(a), MemberValue::Int(b)) => a == b,
            // bit comparison so that equal values stay equal through NaN
            (MemberValue::Double(a), MemberValue::Double(b)) => a.to_bits() == b.to_bits(),
            (MemberValue::String(a), MemberValue::String(b)) => a == b,
            (
                MemberValue::Enum {
                    type_name: at,
                    variant: av,
                },
                MemberValue::Enum {
                    type_name: bt,
                    variant: bv,
                },
            ) => at == bt && av == bv,
            (MemberValue::Class(a), MemberValue::Class(b)) => a == b,
            (MemberValue::Annotation(a), MemberValue::Annotation(b)) => a == b,
            (MemberValue::Array(a), MemberValue::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for MemberValue {}

impl From<bool> for MemberValue {
    fn from(value: bool) -> Self {
        MemberValue::Bool(value)
    }
}

impl From<i64> for MemberValue {
    fn from(value: i64) -> Self {
        MemberValue::Int(value)
    }
}

impl From<&str> for MemberValue {
    fn from(value: &str) -> Self {
        MemberValue::String(value.to_owned())
    }
}

/// One resolved annotation occurrence.
///
/// Immutable once built; structural changes go through
/// [`AnnotationValueBuilder`], which produces a new value.
///
/// `default_values` and `stereotypes` both distinguish "not yet computed"
/// (`None`) from "computed and empty" (`Some` of an empty collection). The
/// resolution engine relies on that distinction to avoid re-deriving state
/// that was legitimately resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationValue {
    name: String,
    values: IndexMap<String, MemberValue>,
    default_values: Option<IndexMap<String, MemberValue>>,
    retention: RetentionPolicy,
    stereotypes: Option<Vec<AnnotationValue>>,
}

impl AnnotationValue {
    /// A value with no members and no resolved defaults or stereotypes.
    pub fn new(name: impl Into<String>) -> Self {
        AnnotationValueBuilder::new(name).build()
    }

    pub fn builder(name: impl Into<String>) -> AnnotationValueBuilder {
        AnnotationValueBuilder::new(name)
    }

    /// Rebuild this value, preserving all current state.
    pub fn into_builder(self) -> AnnotationValueBuilder {
        AnnotationValueBuilder {
            name: self.name,
            values: self.values,
            default_values: self.default_values,
            retention: self.retention,
            stereotypes: self.stereotypes,
        }
    }

    /// Fully qualified annotation type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &IndexMap<String, MemberValue> {
        &self.values
    }

    pub fn get(&self, member: &str) -> Option<&MemberValue> {
        self.values.get(member)
    }

    pub fn is_present(&self, member: &str) -> bool {
        self.values.contains_key(member)
    }

    /// A member's string form, falling back to resolved defaults.
    pub fn string_value(&self, member: &str) -> Option<&str> {
        self.values
            .get(member)
            .or_else(|| self.default_values.as_ref().and_then(|d| d.get(member)))
            .and_then(MemberValue::as_str)
    }

    /// `None` means defaults were not resolved yet; an empty map is a valid
    /// resolved state.
    pub fn default_values(&self) -> Option<&IndexMap<String, MemberValue>> {
        self.default_values.as_ref()
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// `None` means stereotypes were not computed yet, distinct from a
    /// computed empty list.
    pub fn stereotypes(&self) -> Option<&[AnnotationValue]> {
        self.stereotypes.as_deref()
    }

    /// Merge `other` into this value, keeping this value's resolved defaults,
    /// retention and stereotype state and overlaying `other`'s members.
    ///
    /// Used when an alias-derived value overlaps a native stereotype entry:
    /// the native entry supplies the type-level metadata the alias form lacks.
    pub fn merged_with(&self, other: &AnnotationValue) -> AnnotationValue {
        let mut values = self.values.clone();
        for (member, value) in other.values() {
            values.insert(member.clone(), value.clone());
        }
        AnnotationValue {
            name: self.name.clone(),
            values,
            default_values: self.default_values.clone(),
            retention: self.retention,
            stereotypes: self.stereotypes.clone(),
        }
    }
}

/// Builds immutable [`AnnotationValue`]s.
#[derive(Debug, Clone)]
pub struct AnnotationValueBuilder {
    name: String,
    values: IndexMap<String, MemberValue>,
    default_values: Option<IndexMap<String, MemberValue>>,
    retention: RetentionPolicy,
    stereotypes: Option<Vec<AnnotationValue>>,
}

impl AnnotationValueBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
            default_values: None,
            retention: RetentionPolicy::default(),
            stereotypes: None,
        }
    }

    pub fn member(mut self, name: impl Into<String>, value: impl Into<MemberValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn members(mut self, values: IndexMap<String, MemberValue>) -> Self {
        self.values = values;
        self
    }

    /// Mark defaults as resolved. Passing an empty map records the
    /// "resolved, nothing to apply" state.
    pub fn default_values(mut self, defaults: IndexMap<String, MemberValue>) -> Self {
        self.default_values = Some(defaults);
        self
    }

    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn stereotype(mut self, value: AnnotationValue) -> Self {
        self.stereotypes.get_or_insert_with(Vec::new).push(value);
        self
    }

    /// Mark stereotypes as computed. Passing an empty list suppresses native
    /// meta-annotation extraction for this value.
    pub fn stereotypes(mut self, stereotypes: Vec<AnnotationValue>) -> Self {
        self.stereotypes = Some(stereotypes);
        self
    }

    pub fn build(self) -> AnnotationValue {
        AnnotationValue {
            name: self.name,
            values: self.values,
            default_values: self.default_values,
            retention: self.retention,
            stereotypes: self.stereotypes,
        }
    }
}
