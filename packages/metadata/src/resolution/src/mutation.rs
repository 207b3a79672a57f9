use std::sync::Arc;

use crate::diagnostics::MetadataError;
use crate::incremental::MetadataKey;
use crate::metadata::{
    AnnotationMetadata, AnnotationMetadataHierarchy, AnnotationValue, MutableAnnotationMetadata,
};
use crate::reflection::ElementId;

use super::context::ProcessingContext;
use super::engine::MetadataBuilder;

/// Post-build editing of resolved metadata, e.g. by a later compiler pass
/// annotating an element programmatically.
///
/// Every operation works on a mutable copy of the input (materializing one
/// from the canonical empty singleton when needed) and returns a new
/// immutable snapshot; hierarchy variants replace only the declared layer
/// and preserve the inherited layer unchanged.
impl<'a> MetadataBuilder<'a> {
    /// Add an annotation to existing metadata. The value is run through
    /// default resolution and the full per-annotation pipeline, so its
    /// aliases, stereotypes and extensions apply exactly as they would at
    /// build time.
    pub fn annotate(
        &self,
        metadata: &Arc<AnnotationMetadata>,
        value: AnnotationValue,
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        let mut mutable = MutableAnnotationMetadata::from_metadata(metadata);
        let prepared = self.resolve_defaults(value);
        self.process_annotation(&mut mutable, &ProcessingContext::root(), prepared, true)?;
        Ok(finish(mutable))
    }

    /// [`annotate`](Self::annotate) an element's cached metadata, updating
    /// the session cache entry and flagging it mutated.
    ///
    /// When the element is itself an annotation declaration, the value is
    /// also recorded in the session side table so future resolutions of any
    /// annotation carrying that declaration as a stereotype pick it up.
    pub fn annotate_element(
        &self,
        element: &ElementId,
        metadata: &Arc<AnnotationMetadata>,
        value: AnnotationValue,
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        let result = self.annotate(metadata, value.clone())?;
        if self.host().annotation_declaration(element.as_str()).is_some() {
            self.session()
                .record_added_stereotype(element.as_str(), value);
        }
        self.session()
            .update(&MetadataKey::Element(element.clone()), result.clone());
        Ok(result)
    }

    pub fn annotate_hierarchy(
        &self,
        hierarchy: &AnnotationMetadataHierarchy,
        value: AnnotationValue,
    ) -> Result<AnnotationMetadataHierarchy, MetadataError> {
        let declared = self.annotate(hierarchy.declared(), value)?;
        Ok(hierarchy.with_declared(declared))
    }

    pub fn remove_annotation(
        &self,
        metadata: &Arc<AnnotationMetadata>,
        type_name: &str,
    ) -> Arc<AnnotationMetadata> {
        let mut mutable = MutableAnnotationMetadata::from_metadata(metadata);
        mutable.remove_annotation(type_name);
        finish(mutable)
    }

    pub fn remove_stereotype(
        &self,
        metadata: &Arc<AnnotationMetadata>,
        type_name: &str,
    ) -> Arc<AnnotationMetadata> {
        let mut mutable = MutableAnnotationMetadata::from_metadata(metadata);
        mutable.remove_stereotype(type_name);
        finish(mutable)
    }

    pub fn remove_annotation_if<F>(
        &self,
        metadata: &Arc<AnnotationMetadata>,
        predicate: F,
    ) -> Arc<AnnotationMetadata>
    where
        F: Fn(&AnnotationValue) -> bool,
    {
        let mut mutable = MutableAnnotationMetadata::from_metadata(metadata);
        mutable.remove_annotation_if(predicate);
        finish(mutable)
    }

    pub fn remove_annotation_hierarchy(
        &self,
        hierarchy: &AnnotationMetadataHierarchy,
        type_name: &str,
    ) -> AnnotationMetadataHierarchy {
        hierarchy.with_declared(self.remove_annotation(hierarchy.declared(), type_name))
    }

    pub fn remove_stereotype_hierarchy(
        &self,
        hierarchy: &AnnotationMetadataHierarchy,
        type_name: &str,
    ) -> AnnotationMetadataHierarchy {
        hierarchy.with_declared(self.remove_stereotype(hierarchy.declared(), type_name))
    }
}

fn finish(mutable: MutableAnnotationMetadata) -> Arc<AnnotationMetadata> {
    if mutable.is_empty() {
        AnnotationMetadata::empty()
    } else {
        Arc::new(mutable.build())
    }
}
