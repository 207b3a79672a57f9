use std::collections::HashMap;

use indexmap::IndexMap;

use super::api::AnnotationMetadata;
use super::value::{AnnotationValue, MemberValue, RetentionPolicy};

/// Write-side accumulator for one element's metadata, populated during a
/// build and frozen into an [`AnnotationMetadata`] afterwards.
///
/// Annotations are split into the "declared" view (physically present on
/// the element being built) and the "all" view (declared plus inherited
/// plus stereotypes). Re-adding an annotation name merges member maps with
/// the later write winning per member; since ancestors are applied before
/// descendants, override semantics fall out of insertion order.
#[derive(Debug, Clone, Default)]
pub struct MutableAnnotationMetadata {
    all_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
    declared_annotations: IndexMap<String, IndexMap<String, MemberValue>>,
    all_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
    declared_stereotypes: IndexMap<String, IndexMap<String, MemberValue>>,
    /// Stereotype name -> names of the top-level annotations that carry it.
    annotations_by_stereotype: IndexMap<String, Vec<String>>,
    annotation_defaults: HashMap<String, IndexMap<String, MemberValue>>,
    /// Repeatable annotation name -> individual occurrences.
    repeated: IndexMap<String, Vec<AnnotationValue>>,
    declared_repeated: IndexMap<String, Vec<AnnotationValue>>,
    /// Repeatable annotation name -> its container annotation name.
    repeatable_containers: HashMap<String, String>,
    retention: HashMap<String, RetentionPolicy>,
}

impl MutableAnnotationMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a mutable copy of an immutable metadata snapshot, for the
    /// post-build mutation API.
    pub fn from_metadata(metadata: &AnnotationMetadata) -> Self {
        metadata.to_mutable()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_snapshot(
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

    fn record_common(&mut self, value: &AnnotationValue) {
        self.retention
            .insert(value.name().to_owned(), value.retention());
        if let Some(defaults) = value.default_values() {
            self.annotation_defaults
                .entry(value.name().to_owned())
                .or_insert_with(|| defaults.clone());
        }
    }

    fn merge_into(
        target: &mut IndexMap<String, IndexMap<String, MemberValue>>,
        name: &str,
        values: &IndexMap<String, MemberValue>,
    ) {
        let entry = target.entry(name.to_owned()).or_default();
        for (member, value) in values {
            entry.insert(member.clone(), value.clone());
        }
    }

    pub fn add_annotation(&mut self, value: &AnnotationValue, declared: bool) {
        self.record_common(value);
        Self::merge_into(&mut self.all_annotations, value.name(), value.values());
        if declared {
            Self::merge_into(&mut self.declared_annotations, value.name(), value.values());
        }
    }

    /// Add a stereotype found along `parent_route` (the ancestor annotation
    /// names from the top-level annotation down to the direct parent).
    pub fn add_stereotype(
        &mut self,
        parent_route: &[String],
        value: &AnnotationValue,
        declared: bool,
    ) {
        self.record_common(value);
        Self::merge_into(&mut self.all_stereotypes, value.name(), value.values());
        if declared {
            Self::merge_into(&mut self.declared_stereotypes, value.name(), value.values());
        }
        if let Some(root) = parent_route.first() {
            let carriers = self
                .annotations_by_stereotype
                .entry(value.name().to_owned())
                .or_default();
            if !carriers.iter().any(|c| c == root) {
                carriers.push(root.clone());
            }
        }
    }

    /// Add one occurrence of a repeatable annotation. The container entry is
    /// synthesized separately by the resolution engine.
    pub fn add_repeated(&mut self, value: AnnotationValue, declared: bool) {
        self.record_common(&value);
        if declared {
            self.declared_repeated
                .entry(value.name().to_owned())
                .or_default()
                .push(value.clone());
        }
        self.repeated
            .entry(value.name().to_owned())
            .or_default()
            .push(value);
    }

    pub fn record_repeatable_container(
        &mut self,
        repeatable: impl Into<String>,
        container: impl Into<String>,
    ) {
        self.repeatable_containers
            .entry(repeatable.into())
            .or_insert_with(|| container.into());
    }

    pub fn container_for(&self, repeatable: &str) -> Option<&str> {
        self.repeatable_containers.get(repeatable).map(String::as_str)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.all_annotations.contains_key(name) || self.repeated.contains_key(name)
    }

    pub fn has_declared_annotation(&self, name: &str) -> bool {
        self.declared_annotations.contains_key(name) || self.declared_repeated.contains_key(name)
    }

    pub fn has_stereotype(&self, name: &str) -> bool {
        self.all_stereotypes.contains_key(name) || self.has_annotation(name)
    }

    pub fn has_declared_stereotype(&self, name: &str) -> bool {
        self.declared_stereotypes.contains_key(name) || self.has_declared_annotation(name)
    }

    pub fn declared_stereotype_values(&self, name: &str) -> Option<&IndexMap<String, MemberValue>> {
        self.declared_stereotypes.get(name)
    }

    /// Remove an annotation and every stereotype that no other annotation
    /// still carries.
    pub fn remove_annotation(&mut self, name: &str) {
        self.all_annotations.shift_remove(name);
        self.declared_annotations.shift_remove(name);
        self.repeated.shift_remove(name);
        self.declared_repeated.shift_remove(name);
        self.annotation_defaults.remove(name);
        self.retention.remove(name);

        let mut orphaned = Vec::new();
        for (stereotype, carriers) in self.annotations_by_stereotype.iter_mut() {
            carriers.retain(|c| c != name);
            if carriers.is_empty() {
                orphaned.push(stereotype.clone());
            }
        }
        for stereotype in orphaned {
            self.remove_stereotype(&stereotype);
        }
    }

    pub fn remove_stereotype(&mut self, name: &str) {
        self.all_stereotypes.shift_remove(name);
        self.declared_stereotypes.shift_remove(name);
        self.annotations_by_stereotype.shift_remove(name);
    }

    /// Remove every annotation matching `predicate`, which receives each
    /// annotation reconstructed as an [`AnnotationValue`].
    pub fn remove_annotation_if<F>(&mut self, predicate: F)
    where
        F: Fn(&AnnotationValue) -> bool,
    {
        let mut doomed = Vec::new();
        for (name, values) in &self.all_annotations {
            if predicate(&self.reconstruct(name, values)) {
                doomed.push(name.clone());
            }
        }
        for (name, occurrences) in &self.repeated {
            if doomed.contains(name) {
                continue;
            }
            if occurrences.iter().any(&predicate) {
                doomed.push(name.clone());
            }
        }
        for name in doomed {
            self.remove_annotation(&name);
        }
    }

    fn reconstruct(&self, name: &str, values: &IndexMap<String, MemberValue>) -> AnnotationValue {
        let mut builder = AnnotationValue::builder(name).members(values.clone());
        if let Some(defaults) = self.annotation_defaults.get(name) {
            builder = builder.default_values(defaults.clone());
        }
        if let Some(retention) = self.retention.get(name) {
            builder = builder.retention(*retention);
        }
        builder.build()
    }

    /// Freeze into the immutable result.
    pub fn build(self) -> AnnotationMetadata {
        AnnotationMetadata::from_parts(
            self.all_annotations,
            self.declared_annotations,
            self.all_stereotypes,
            self.declared_stereotypes,
            self.annotations_by_stereotype,
            self.annotation_defaults,
            self.repeated,
            self.declared_repeated,
            self.repeatable_containers,
            self.retention,
        )
    }
}
