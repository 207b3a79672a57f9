use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::warn;

use super::api::{AnnotationMapper, AnnotationRemapper, AnnotationTransformer, ALL_PACKAGES};

static GLOBAL: OnceCell<Arc<ExtensionRegistry>> = OnceCell::new();

/// Lookup table of every registered Mapper, Transformer and Remapper.
/// Immutable once built; discovery (service-loading, codegen'd tables,
/// static registration) is the embedding frontend's concern.
#[derive(Default)]
pub struct ExtensionRegistry {
    mappers: HashMap<String, Vec<Arc<dyn AnnotationMapper>>>,
    transformers: HashMap<String, Vec<Arc<dyn AnnotationTransformer>>>,
    remappers: HashMap<String, Vec<Arc<dyn AnnotationRemapper>>>,
}

impl ExtensionRegistry {
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::default()
    }

    /// The process-wide registry. Installed at most once per process via
    /// [`ExtensionRegistry::install_global`]; before installation this is an
    /// empty registry.
    pub fn global() -> Arc<ExtensionRegistry> {
        GLOBAL
            .get_or_init(|| Arc::new(ExtensionRegistry::default()))
            .clone()
    }

    /// Install the process-wide registry. Fails if one was already
    /// installed (including the implicit empty one from [`global`]).
    pub fn install_global(registry: Arc<ExtensionRegistry>) -> Result<(), Arc<ExtensionRegistry>> {
        GLOBAL.set(registry)
    }

    pub fn mappers_for(&self, annotation_type: &str) -> &[Arc<dyn AnnotationMapper>] {
        self.mappers
            .get(annotation_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn transformers_for(&self, annotation_type: &str) -> &[Arc<dyn AnnotationTransformer>] {
        self.transformers
            .get(annotation_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remappers for an annotation's package, followed by the global
    /// (`"*"`) remappers.
    pub fn remappers_for<'a>(
        &'a self,
        package: &str,
    ) -> impl Iterator<Item = &'a Arc<dyn AnnotationRemapper>> {
        self.remappers
            .get(package)
            .into_iter()
            .chain(self.remappers.get(ALL_PACKAGES))
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty() && self.transformers.is_empty() && self.remappers.is_empty()
    }
}

/// Builds an [`ExtensionRegistry`].
///
/// The `load_*` variants take fallible factories: a factory failure is
/// logged and that plugin alone is skipped, matching plugin-discovery
/// semantics where one broken provider must not abort the registry load.
#[derive(Default)]
pub struct ExtensionRegistryBuilder {
    registry: ExtensionRegistry,
}

impl ExtensionRegistryBuilder {
    pub fn register_mapper(mut self, mapper: Arc<dyn AnnotationMapper>) -> Self {
        self.registry
            .mappers
            .entry(mapper.annotation_type().to_owned())
            .or_default()
            .push(mapper);
        self
    }

    pub fn register_transformer(mut self, transformer: Arc<dyn AnnotationTransformer>) -> Self {
        self.registry
            .transformers
            .entry(transformer.annotation_type().to_owned())
            .or_default()
            .push(transformer);
        self
    }

    pub fn register_remapper(mut self, remapper: Arc<dyn AnnotationRemapper>) -> Self {
        self.registry
            .remappers
            .entry(remapper.package_name().to_owned())
            .or_default()
            .push(remapper);
        self
    }

    pub fn load_mapper<F>(self, factory: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn AnnotationMapper>>,
    {
        match factory() {
            Ok(mapper) => self.register_mapper(mapper),
            Err(error) => {
                warn!(%error, "skipping annotation mapper that failed to load");
                self
            }
        }
    }

    pub fn load_transformer<F>(self, factory: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn AnnotationTransformer>>,
    {
        match factory() {
            Ok(transformer) => self.register_transformer(transformer),
            Err(error) => {
                warn!(%error, "skipping annotation transformer that failed to load");
                self
            }
        }
    }

    pub fn load_remapper<F>(self, factory: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn AnnotationRemapper>>,
    {
        match factory() {
            Ok(remapper) => self.register_remapper(remapper),
            Err(error) => {
                warn!(%error, "skipping annotation remapper that failed to load");
                self
            }
        }
    }

    pub fn build(self) -> Arc<ExtensionRegistry> {
        Arc::new(self.registry)
    }
}

/// The package portion of a fully qualified annotation type name.
pub fn package_of(type_name: &str) -> &str {
    type_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}
