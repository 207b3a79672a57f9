use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::mutable::MutableAnnotationMetadata;
use super::value::{AnnotationValue, MemberValue, RetentionPolicy};

static EMPTY: Lazy<Arc<AnnotationMetadata>> =
    Lazy::new(|| Arc::new(AnnotationMetadata::default()));

/// The fused, normalized view of every annotation applying to one element:
/// declared annotations, inherited annotations, stereotypes indexed by the
/// annotations that carry them, and repeatable groupings.
///
/// Immutable. Produced once per element per build request; an element with
/// nothing to report shares the canonical empty singleton (see
/// [`AnnotationMetadata::empty`]), so emptiness can be checked by `Arc`
/// identity as well as by [`AnnotationMetadata::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationMetadata {
    all_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
    declared_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
    all_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
    declared_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
    annotations_by_stereotype: IndexMap<String, Vec<String>>,
    annotation_defaults: HashMap<String, IndexMap<String, MemberValue>>,
    repeated: IndexMap<String, Vec<AnnotationValue>>,
    declared_repeated: IndexMap<String, Vec<AnnotationValue>>,
    repeatable_containers: HashMap<String, String>,
    retention: HashMap<String, RetentionPolicy>,
}

impl AnnotationMetadata {
    /// The canonical empty metadata. Always the same allocation, so
    /// `Arc::ptr_eq` against it is a cheap emptiness check.
    pub fn empty() -> Arc<AnnotationMetadata> {
        EMPTY.clone()
    }

    pub fn is_empty_singleton(metadata: &Arc<AnnotationMetadata>) -> bool {
        Arc::ptr_eq(metadata, &EMPTY)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        all_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
        declared_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
        all_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
        declared_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
        annotations_by_stereotype: IndexMap<String, Vec<String>>,
        annotation_defaults: HashMap<String, IndexMap<String, MemberValue>>,
        repeated: IndexMap<String, Vec<AnnotationValue>>,
        declared_repeated: IndexMap<String, Vec<AnnotationValue>>,
        repeatable_containers: HashMap<String, String>,
        retention: HashMap<String, RetentionPolicy>,
    ) -> Self {
        Self {
            all_annotations,
            declared_annotations,
            all_stereotypes,
            declared_stereotypes,
            annotations_by_stereotype,
            annotation_defaults,
            repeated,
            declared_repeated,
            repeatable_containers,
            retention,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all_annotations.is_empty()
            && self.all_stereotypes.is_empty()
            && self.repeated.is_empty()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.all_annotations.contains_key(name) || self.repeated.contains_key(name)
    }

    pub fn has_declared_annotation(&self, name: &str) -> bool {
        self.declared_annotations.contains_key(name) || self.declared_repeated.contains_key(name)
    }

    /// Whether `name` applies to the element either directly or as a
    /// meta-annotation of something that does.
    pub fn has_stereotype(&self, name: &str) -> bool {
        self.all_stereotypes.contains_key(name) || self.has_annotation(name)
    }

    pub fn has_declared_stereotype(&self, name: &str) -> bool {
        self.declared_stereotypes.contains_key(name) || self.has_declared_annotation(name)
    }

    pub fn annotation_names(&self) -> impl Iterator<Item = &str> {
        self.all_annotations
            .keys()
            .chain(self.repeated.keys())
            .map(String::as_str)
    }

    pub fn declared_annotation_names(&self) -> impl Iterator<Item = &str> {
        self.declared_annotations
            .keys()
            .chain(self.declared_repeated.keys())
            .map(String::as_str)
    }

    pub fn stereotype_names(&self) -> impl Iterator<Item = &str> {
        self.all_stereotypes.keys().map(String::as_str)
    }

    /// Names of the top-level annotations that carry `stereotype`.
    pub fn annotation_names_by_stereotype(&self, stereotype: &str) -> Vec<String> {
        self.annotations_by_stereotype
            .get(stereotype)
            .cloned()
            .unwrap_or_default()
    }

    /// Member values of an annotation or stereotype, merged across every
    /// level that contributed to it.
    pub fn values_of(&self, name: &str) -> Option<&IndexMap<String, MemberValue>> {
        self.all_annotations
            .get(name)
            .or_else(|| self.all_stereotypes.get(name))
    }

    pub fn get(&self, annotation: &str, member: &str) -> Option<&MemberValue> {
        self.values_of(annotation)
            .and_then(|values| values.get(member))
            .or_else(|| {
                self.annotation_defaults
                    .get(annotation)
                    .and_then(|defaults| defaults.get(member))
            })
    }

    pub fn string_value(&self, annotation: &str, member: &str) -> Option<&str> {
        self.get(annotation, member).and_then(MemberValue::as_str)
    }

    pub fn default_values_of(&self, annotation: &str) -> Option<&IndexMap<String, MemberValue>> {
        self.annotation_defaults.get(annotation)
    }

    /// Individual occurrences of a repeatable annotation.
    pub fn repeated_values_of(&self, name: &str) -> &[AnnotationValue] {
        self.repeated.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn container_for(&self, repeatable: &str) -> Option<&str> {
        self.repeatable_containers
            .get(repeatable)
            .map(String::as_str)
    }

    pub fn retention_of(&self, annotation: &str) -> Option<RetentionPolicy> {
        self.retention.get(annotation).copied()
    }

    /// Debug/dump surface for embedders; not a persistence format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn to_mutable(&self) -> MutableAnnotationMetadata {
        MutableAnnotationMetadata::from_snapshot(
            self.all_annotations.clone(),
            self.declared_annotations.clone(),
            self.all_stereotypes.clone(),
            self.declared_stereotypes.clone(),
            self.annotations_by_stereotype.clone(),
            self.annotation_defaults.clone(),
            self.repeated.clone(),
            self.declared_repeated.clone(),
            self.repeatable_containers.clone(),
            self.retention.clone(),
        )
    }
}
