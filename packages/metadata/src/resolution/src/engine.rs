use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticSink, ErrorCode, MetadataError};
use crate::incremental::{MetadataKey, MetadataSession};
use crate::metadata::{
    AnnotationMetadata, AnnotationValue, MemberValue, MutableAnnotationMetadata,
};
use crate::reflection::{ElementId, HostError, RawAnnotation, ReflectionHost};
use crate::transform::{package_of, ExtensionRegistry};

use super::aliases::resolve_aliases;
use super::config::{BuilderConfig, VALUE_MEMBER};
use super::context::ProcessingContext;
use super::repeatable::repeatable_split;
use super::validation::{is_unresolved_placeholder, AnnotatedElementValidator};

/// The resolution engine. Computes a fused, normalized [`AnnotationMetadata`]
/// view for one element at a time: type-hierarchy flattening, alias
/// resolution, stereotype expansion, default resolution, repeatable
/// flattening, and the Mapper -> Remapper -> Transformer chain.
///
/// Holds no per-element state of its own; everything cross-element lives in
/// the shared [`MetadataSession`].
pub struct MetadataBuilder<'a> {
    host: &'a dyn ReflectionHost,
    session: &'a MetadataSession,
    registry: Arc<ExtensionRegistry>,
    config: BuilderConfig,
    validator: Option<Box<dyn AnnotatedElementValidator>>,
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> MetadataBuilder<'a> {
    /// An engine over `host` using the process-wide extension registry and
    /// default configuration.
    pub fn new(host: &'a dyn ReflectionHost, session: &'a MetadataSession) -> Self {
        Self {
            host,
            session,
            registry: ExtensionRegistry::global(),
            config: BuilderConfig::default(),
            validator: None,
            sink: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn AnnotatedElementValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_diagnostics(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub(crate) fn host(&self) -> &dyn ReflectionHost {
        self.host
    }

    pub(crate) fn session(&self) -> &MetadataSession {
        self.session
    }

    /// Full metadata for an element: declared annotations plus everything
    /// inherited along its type hierarchy plus stereotypes.
    pub fn build(&self, element: &ElementId) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        self.build_with_parents(&[], element)
    }

    /// Declared-only metadata: no hierarchy walk, just the annotations
    /// physically present on the element.
    pub fn build_declared(
        &self,
        element: &ElementId,
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        match self.hierarchy_of(element, false, true)? {
            Some(levels) => self.build_levels(element, &levels),
            None => Ok(AnnotationMetadata::empty()),
        }
    }

    /// Full metadata with the hierarchies of `parents` (e.g. a method's
    /// owning type) applied first, so element-level annotations override
    /// parent-level ones.
    pub fn build_with_parents(
        &self,
        parents: &[ElementId],
        element: &ElementId,
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        let mut levels: Vec<ElementId> = Vec::new();
        for parent in parents {
            match self.hierarchy_of(parent, true, false)? {
                Some(mut hierarchy) => {
                    hierarchy.reverse();
                    levels.extend(hierarchy);
                }
                None => return Ok(AnnotationMetadata::empty()),
            }
        }
        match self.hierarchy_of(element, true, false)? {
            Some(mut hierarchy) => {
                hierarchy.reverse();
                levels.extend(hierarchy);
            }
            None => return Ok(AnnotationMetadata::empty()),
        }
        self.build_levels(element, &levels)
    }

    /// Cache-aware build: returns the session's entry for `key` when
    /// present (including post-build mutations), otherwise builds and
    /// caches. First insert wins under concurrent access.
    pub fn lookup_or_build(
        &self,
        key: MetadataKey,
        element: &ElementId,
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        if let Some(hit) = self.session.lookup(&key) {
            return Ok(hit);
        }
        let built = self.build(element)?;
        Ok(self.session.insert_if_absent(key, built))
    }

    fn hierarchy_of(
        &self,
        element: &ElementId,
        inherit_type_annotations: bool,
        declared_only: bool,
    ) -> Result<Option<Vec<ElementId>>, MetadataError> {
        match self
            .host
            .type_hierarchy_of(element, inherit_type_annotations, declared_only)
        {
            Ok(hierarchy) => Ok(Some(hierarchy)),
            Err(HostError::Recoverable(reason)) => {
                debug!(element = %element, %reason, "recoverable host failure, yielding empty metadata");
                Ok(None)
            }
            Err(HostError::Fatal(reason)) => Err(MetadataError::Host(reason)),
        }
    }

    /// Apply `levels` in order (most distant ancestor first); only the
    /// level equal to `element` itself contributes to the declared view.
    fn build_levels(
        &self,
        element: &ElementId,
        levels: &[ElementId],
    ) -> Result<Arc<AnnotationMetadata>, MetadataError> {
        let mut metadata = MutableAnnotationMetadata::new();
        for level in levels {
            let declared = level == element;
            let raw = match self.host.annotations_of(level) {
                Ok(raw) => raw,
                Err(HostError::Recoverable(reason)) => {
                    debug!(element = %level, %reason, "recoverable host failure, yielding empty metadata");
                    return Ok(AnnotationMetadata::empty());
                }
                Err(HostError::Fatal(reason)) => return Err(MetadataError::Host(reason)),
            };
            if raw.is_empty() {
                continue;
            }
            trace!(element = %level, count = raw.len(), declared, "processing hierarchy level");
            for annotation in raw {
                if declared {
                    self.validate_members(element, &annotation);
                }
                let value = self.initial_value(annotation);
                self.process_annotation(
                    &mut metadata,
                    &ProcessingContext::root(),
                    value,
                    declared,
                )?;
            }
        }
        self.apply_default_scope(&mut metadata)?;
        if metadata.is_empty() {
            return Ok(AnnotationMetadata::empty());
        }
        Ok(Arc::new(metadata.build()))
    }

    /// An [`AnnotationValue`] for a raw occurrence, with retention taken
    /// from the annotation type's declaration. Defaults and stereotypes stay
    /// unresolved here.
    fn initial_value(&self, raw: RawAnnotation) -> AnnotationValue {
        let retention = self
            .host
            .annotation_declaration(&raw.type_name)
            .map(|declaration| declaration.retention)
            .unwrap_or_default();
        AnnotationValue::builder(raw.type_name)
            .members(raw.values)
            .retention(retention)
            .build()
    }

    /// Pipeline entry: guard, then run the value through defaults, aliases,
    /// the transform chain and repeatable flattening.
    pub(crate) fn process_annotation(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        ctx: &ProcessingContext,
        value: AnnotationValue,
        declared: bool,
    ) -> Result<(), MetadataError> {
        let name = value.name();
        // the inherited marker always short-circuits as a no-op
        if name == self.config.inherited_marker {
            return Ok(());
        }
        if self.config.is_internal(name) {
            return Ok(());
        }
        if ctx.is_ancestor(name) {
            trace!(annotation = name, "cycle guard dropped re-entrant annotation");
            return Ok(());
        }
        self.process_resolved(metadata, ctx, value, declared)
    }

    /// Pipeline from defaults resolution onward. Individual occurrences of
    /// a flattened repeatable container re-enter here directly.
    fn process_resolved(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        ctx: &ProcessingContext,
        value: AnnotationValue,
        declared: bool,
    ) -> Result<(), MetadataError> {
        let name = value.name().to_owned();
        let declaration = self.host.annotation_declaration(&name);

        if let Some(declaration) = &declaration {
            if let Some(container) = &declaration.repeatable_container {
                metadata.record_repeatable_container(&name, container);
            }
        }

        let value = self.resolve_defaults(value);
        let (value, introduced) = resolve_aliases(&self.config, value, declaration.as_ref())?;

        // mappers are additive: the original value continues through the
        // pipeline regardless of what they emit
        for mapper in self.registry.mappers_for(&name) {
            if ctx.has_processed(mapper.name()) {
                continue;
            }
            let mapped = mapper.map(&value);
            if mapped.is_empty() {
                continue;
            }
            let next = ctx.with_processed_visitor(mapper.name());
            for produced in mapped {
                if produced != value {
                    trace!(
                        annotation = %name,
                        mapper = mapper.name(),
                        produced = produced.name(),
                        "mapper contributed annotation"
                    );
                    self.process_annotation(metadata, &next, produced, declared)?;
                }
            }
        }

        // remappers and transformers are substitutive: a replacement ends
        // this value's processing entirely
        for remapper in self.registry.remappers_for(package_of(&name)) {
            if ctx.has_processed(remapper.name()) {
                continue;
            }
            let remapped = remapper.remap(&value);
            if remapped.len() == 1 && remapped[0] == value {
                continue;
            }
            trace!(annotation = %name, remapper = remapper.name(), "remapper replaced annotation");
            let next = ctx.with_processed_visitor(remapper.name());
            for produced in remapped {
                self.process_annotation(metadata, &next, produced, declared)?;
            }
            return Ok(());
        }

        for transformer in self.registry.transformers_for(&name) {
            if ctx.has_processed(transformer.name()) {
                continue;
            }
            let transformed = transformer.transform(&value);
            if transformed.len() == 1 && transformed[0] == value {
                continue;
            }
            trace!(
                annotation = %name,
                transformer = transformer.name(),
                "transformer replaced annotation"
            );
            let next = ctx.with_processed_visitor(transformer.name());
            for produced in transformed {
                self.process_annotation(metadata, &next, produced, declared)?;
            }
            return Ok(());
        }

        let split = repeatable_split(&value, |repeatable| self.container_of(metadata, repeatable));
        if let Some((container, occurrences)) = split {
            self.add_value(metadata, ctx, container, introduced, declared)?;
            for occurrence in occurrences {
                self.process_resolved(metadata, ctx, occurrence, declared)?;
            }
            return Ok(());
        }

        self.add_value(metadata, ctx, value, introduced, declared)
    }

    /// Record a fully processed value and recurse into its stereotypes.
    fn add_value(
        &self,
        metadata: &mut MutableAnnotationMetadata,
        ctx: &ProcessingContext,
        value: AnnotationValue,
        introduced: Vec<AnnotationValue>,
        declared: bool,
    ) -> Result<(), MetadataError> {
        let name = value.name().to_owned();

        let mut stereotypes: Vec<AnnotationValue> = Vec::new();
        if let Some(preset) = value.stereotypes() {
            // the value arrived with computed stereotypes (alias rewriting
            // output); native extraction must not run again
            stereotypes.extend(preset.iter().cloned());
        } else if let Some(declaration) = self.host.annotation_declaration(&name) {
            for meta in &declaration.annotations {
                if self.config.is_internal(&meta.type_name) {
                    continue;
                }
                if self.config.is_excluded_stereotype(&name, &meta.type_name) {
                    continue;
                }
                let stereotype = self.initial_value(meta.clone());
                if self.config.is_disqualified_nullability(&stereotype) {
                    trace!(annotation = %name, stereotype = stereotype.name(), "nullability rule dropped stereotype");
                    continue;
                }
                stereotypes.push(stereotype);
            }
        }

        // alias-derived values overlapping a native stereotype reuse the
        // native entry, which carries the type-level metadata they lack
        for alias_value in introduced {
            if let Some(existing) = stereotypes
                .iter_mut()
                .find(|stereotype| stereotype.name() == alias_value.name())
            {
                *existing = existing.merged_with(&alias_value);
            } else {
                stereotypes.push(alias_value);
            }
        }

        for added in self.session.added_stereotypes_of(&name) {
            stereotypes.push(added);
        }

        if !ctx.is_root() {
            metadata.add_stereotype(ctx.parent_route(), &value, declared);
        } else if let Some(container) = self.container_of(metadata, &name) {
            metadata.record_repeatable_container(&name, &container);
            let needs_container = !metadata.has_annotation(&container);
            metadata.add_repeated(value.clone(), declared);
            if needs_container {
                let container_value = self.initial_value(RawAnnotation::new(container));
                self.process_annotation(metadata, ctx, container_value, declared)?;
            }
        } else {
            metadata.add_annotation(&value, declared);
        }

        let next = ctx.with_parent(name);
        for stereotype in stereotypes {
            self.process_annotation(metadata, &next, stereotype, declared)?;
        }
        Ok(())
    }

    fn container_of(&self, metadata: &MutableAnnotationMetadata, repeatable: &str) -> Option<String> {
        if let Some(container) = metadata.container_for(repeatable) {
            return Some(container.to_owned());
        }
        self.host
            .annotation_declaration(repeatable)
            .and_then(|declaration| declaration.repeatable_container)
    }

    /// Synthesize the declared scope named by a declared default-scope
    /// stereotype when the element declares no scope of its own.
    fn apply_default_scope(
        &self,
        metadata: &mut MutableAnnotationMetadata,
    ) -> Result<(), MetadataError> {
        let scope_name = {
            let Some(values) =
                metadata.declared_stereotype_values(&self.config.default_scope_marker)
            else {
                return Ok(());
            };
            if metadata.has_declared_stereotype(&self.config.scope_marker) {
                return Ok(());
            }
            match values.get(VALUE_MEMBER) {
                Some(MemberValue::Class(name)) | Some(MemberValue::String(name)) => name.clone(),
                _ => return Ok(()),
            }
        };
        if metadata.has_declared_annotation(&scope_name) {
            return Ok(());
        }
        debug!(scope = %scope_name, "synthesizing default scope annotation");
        let value = self.initial_value(RawAnnotation::new(scope_name));
        self.process_annotation(metadata, &ProcessingContext::root(), value, true)
    }

    /// Populate a value's defaults from the session cache, computing them
    /// once per annotation type.
    pub(crate) fn resolve_defaults(&self, value: AnnotationValue) -> AnnotationValue {
        if value.default_values().is_some() {
            return value;
        }
        let defaults = self.defaults_for(value.name());
        value.into_builder().default_values(defaults).build()
    }

    fn defaults_for(&self, annotation_type: &str) -> IndexMap<String, MemberValue> {
        if let Some(hit) = self.session.defaults_of(annotation_type) {
            return hit;
        }
        let mut in_progress = HashSet::new();
        let computed = self.compute_defaults(annotation_type, &mut in_progress);
        self.session.record_defaults(annotation_type, computed)
    }

    /// `in_progress` is pre-seeded with every type currently being computed
    /// so that self-referential annotation defaults terminate.
    fn compute_defaults(
        &self,
        annotation_type: &str,
        in_progress: &mut HashSet<String>,
    ) -> IndexMap<String, MemberValue> {
        in_progress.insert(annotation_type.to_owned());
        let mut defaults = IndexMap::new();
        let Some(declaration) = self.host.annotation_declaration(annotation_type) else {
            trace!(
                annotation = annotation_type,
                "annotation type not resolvable, recording empty defaults"
            );
            return defaults;
        };
        for member in &declaration.members {
            if let Some(default) = &member.default_value {
                defaults.insert(
                    member.name.clone(),
                    self.fill_nested_defaults(default.clone(), in_progress),
                );
            }
        }
        defaults
    }

    fn fill_nested_defaults(
        &self,
        value: MemberValue,
        in_progress: &mut HashSet<String>,
    ) -> MemberValue {
        match value {
            MemberValue::Annotation(nested) => {
                if nested.default_values().is_some() || in_progress.contains(nested.name()) {
                    return MemberValue::Annotation(nested);
                }
                let nested_defaults = match self.session.defaults_of(nested.name()) {
                    Some(hit) => hit,
                    None => {
                        let computed = self.compute_defaults(nested.name(), in_progress);
                        self.session.record_defaults(nested.name(), computed)
                    }
                };
                MemberValue::Annotation(Box::new(
                    nested.into_builder().default_values(nested_defaults).build(),
                ))
            }
            MemberValue::Array(items) => MemberValue::Array(
                items
                    .into_iter()
                    .map(|item| self.fill_nested_defaults(item, in_progress))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Run constrained members through the pluggable validator, attaching
    /// failures to the element. Unresolved property placeholders are
    /// exempt.
    fn validate_members(&self, element: &ElementId, annotation: &RawAnnotation) {
        let Some(validator) = &self.validator else {
            return;
        };
        let Some(declaration) = self.host.annotation_declaration(&annotation.type_name) else {
            return;
        };
        for member in &declaration.members {
            let constrained = member.annotations.iter().any(|marker| {
                marker.type_name != self.config.alias_marker
                    && marker.type_name != self.config.aliases_marker
            });
            if !constrained {
                continue;
            }
            let Some(value) = annotation.values.get(&member.name) else {
                continue;
            };
            if is_unresolved_placeholder(value) {
                continue;
            }
            for message in validator.validate(element, &annotation.type_name, member, value) {
                self.report(Diagnostic::error(
                    ErrorCode::MemberValidationFailed,
                    element.clone(),
                    message,
                ));
            }
        }
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        match self.sink {
            Some(sink) => sink.report(diagnostic),
            None => debug!(?diagnostic, "diagnostic produced with no sink attached"),
        }
    }
}
