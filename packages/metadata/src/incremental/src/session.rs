use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::metadata::{AnnotationMetadata, AnnotationValue, MemberValue};
use crate::reflection::ElementId;

/// Cache key for resolved metadata: a single element, or a composite for
/// member-within-owner cases (a parameter of a method, a field of a class)
/// where the member id alone is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Element(ElementId),
    Composite { owner: ElementId, member: ElementId },
}

impl MetadataKey {
    pub fn element(id: impl Into<ElementId>) -> Self {
        MetadataKey::Element(id.into())
    }

    pub fn composite(owner: impl Into<ElementId>, member: impl Into<ElementId>) -> Self {
        MetadataKey::Composite {
            owner: owner.into(),
            member: member.into(),
        }
    }
}

/// Cache entry wrapping resolved metadata plus a flag recording whether a
/// later compiler pass mutated it after construction.
#[derive(Debug, Clone)]
pub struct CachedMetadata {
    pub metadata: Arc<AnnotationMetadata>,
    pub mutated: bool,
}

/// State shared across one compilation session: the default-value cache,
/// the per-element (possibly mutated) metadata cache, and the
/// added-stereotypes side table fed by the mutation API.
///
/// A host build system may drive several compilation units in parallel
/// against one session, so every map is lock-guarded. Lookups and inserts
/// are deliberately separate operations rather than an atomic
/// compute-if-absent: resolving one key can reentrantly consult the same
/// cache, and a benign duplicate computation beats a lock cycle. First
/// insert wins.
#[derive(Debug, Default)]
pub struct MetadataSession {
    defaults: RwLock<HashMap<String, IndexMap<String, MemberValue>>>,
    mutated: RwLock<HashMap<MetadataKey, CachedMetadata>>,
    added_stereotypes: RwLock<HashMap<String, Vec<AnnotationValue>>>,
}

impl MetadataSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved defaults for an annotation type, if previously recorded.
    /// An empty map is a valid recorded state and is returned as a hit.
    pub fn defaults_of(&self, annotation_type: &str) -> Option<IndexMap<String, MemberValue>> {
        self.defaults
            .read()
            .ok()
            .and_then(|map| map.get(annotation_type).cloned())
    }

    /// Record computed defaults. If another resolution raced us to it, the
    /// earlier record is kept and returned.
    pub fn record_defaults(
        &self,
        annotation_type: &str,
        defaults: IndexMap<String, MemberValue>,
    ) -> IndexMap<String, MemberValue> {
        if let Ok(mut map) = self.defaults.write() {
            return map
                .entry(annotation_type.to_owned())
                .or_insert(defaults)
                .clone();
        }
        defaults
    }

    pub fn lookup(&self, key: &MetadataKey) -> Option<Arc<AnnotationMetadata>> {
        self.mutated
            .read()
            .ok()
            .and_then(|map| map.get(key).map(|entry| entry.metadata.clone()))
    }

    /// Insert freshly built metadata unless the key is already present;
    /// returns whichever entry won.
    pub fn insert_if_absent(
        &self,
        key: MetadataKey,
        metadata: Arc<AnnotationMetadata>,
    ) -> Arc<AnnotationMetadata> {
        if let Ok(mut map) = self.mutated.write() {
            return map
                .entry(key)
                .or_insert(CachedMetadata {
                    metadata,
                    mutated: false,
                })
                .metadata
                .clone();
        }
        metadata
    }

    /// Replace a cache entry after a post-construction mutation, marking it
    /// dirty.
    pub fn update(&self, key: &MetadataKey, metadata: Arc<AnnotationMetadata>) {
        if let Ok(mut map) = self.mutated.write() {
            map.insert(
                key.clone(),
                CachedMetadata {
                    metadata,
                    mutated: true,
                },
            );
        }
    }

    pub fn is_mutated(&self, key: &MetadataKey) -> bool {
        self.mutated
            .read()
            .ok()
            .and_then(|map| map.get(key).map(|entry| entry.mutated))
            .unwrap_or(false)
    }

    pub fn record_added_stereotype(&self, annotation_type: &str, value: AnnotationValue) {
        if let Ok(mut map) = self.added_stereotypes.write() {
            map.entry(annotation_type.to_owned()).or_default().push(value);
        }
    }

    /// Values annotated onto `annotation_type` after the fact; folded in as
    /// stereotypes whenever that type is expanded in a later resolution.
    pub fn added_stereotypes_of(&self, annotation_type: &str) -> Vec<AnnotationValue> {
        self.added_stereotypes
            .read()
            .ok()
            .and_then(|map| map.get(annotation_type).cloned())
            .unwrap_or_default()
    }

    /// Start a compilation cycle. Per-element metadata from a previous
    /// cycle must not leak into this one.
    pub fn begin_cycle(&self) {
        self.clear_mutated();
    }

    /// End a compilation cycle, releasing everything the cycle accumulated.
    pub fn end_cycle(&self) {
        self.clear_caches();
    }

    pub fn clear_mutated(&self) {
        if let Ok(mut map) = self.mutated.write() {
            map.clear();
        }
    }

    pub fn clear_mutated_key(&self, key: &MetadataKey) {
        if let Ok(mut map) = self.mutated.write() {
            map.remove(key);
        }
    }

    pub fn clear_caches(&self) {
        self.clear_mutated();
        if let Ok(mut map) = self.defaults.write() {
            map.clear();
        }
        if let Ok(mut map) = self.added_stereotypes.write() {
            map.clear();
        }
    }
}
