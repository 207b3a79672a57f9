use std::sync::Arc;

use indexmap::IndexMap;

use super::api::AnnotationMetadata;
use super::value::MemberValue;

/// A layered view over two metadata snapshots: a declared layer (the
/// element's own metadata) over an inherited layer (e.g. the owning type's
/// metadata for a method). The declared layer wins on conflicts.
///
/// Mutations through the resolution engine replace only the declared layer;
/// the inherited layer is shared and preserved unchanged.
#[derive(Debug, Clone)]
pub struct AnnotationMetadataHierarchy {
    inherited: Arc<AnnotationMetadata>,
    declared: Arc<AnnotationMetadata>,
}

impl AnnotationMetadataHierarchy {
    pub fn new(inherited: Arc<AnnotationMetadata>, declared: Arc<AnnotationMetadata>) -> Self {
        Self {
            inherited,
            declared,
        }
    }

    pub fn declared(&self) -> &Arc<AnnotationMetadata> {
        &self.declared
    }

    pub fn inherited(&self) -> &Arc<AnnotationMetadata> {
        &self.inherited
    }

    /// A new hierarchy with the declared layer swapped out.
    pub fn with_declared(&self, declared: Arc<AnnotationMetadata>) -> Self {
        Self {
            inherited: self.inherited.clone(),
            declared,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty() && self.inherited.is_empty()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.declared.has_annotation(name) || self.inherited.has_annotation(name)
    }

    /// Declared in either layer's "declared" view; the inherited layer keeps
    /// its own notion of what was declared on its element.
    pub fn has_declared_annotation(&self, name: &str) -> bool {
        self.declared.has_declared_annotation(name)
    }

    pub fn has_stereotype(&self, name: &str) -> bool {
        self.declared.has_stereotype(name) || self.inherited.has_stereotype(name)
    }

    pub fn values_of(&self, name: &str) -> Option<&IndexMap<String, MemberValue>> {
        self.declared
            .values_of(name)
            .or_else(|| self.inherited.values_of(name))
    }

    pub fn get(&self, annotation: &str, member: &str) -> Option<&MemberValue> {
        self.declared
            .get(annotation, member)
            .or_else(|| self.inherited.get(annotation, member))
    }

    pub fn string_value(&self, annotation: &str, member: &str) -> Option<&str> {
        self.get(annotation, member).and_then(MemberValue::as_str)
    }
}
