use std::collections::HashSet;

use crate::metadata::{AnnotationValue, MemberValue};

/// Default marker annotation names. An embedding frontend overrides these
/// with its platform's fully qualified names.
pub const ALIAS_FOR: &str = "core.annotation.AliasFor";
pub const ALIASES: &str = "core.annotation.Aliases";
pub const INHERITED: &str = "core.annotation.Inherited";
pub const SCOPE: &str = "core.annotation.Scope";
pub const DEFAULT_SCOPE: &str = "core.annotation.DefaultScope";

/// Member names of the alias markers.
pub const ALIAS_MEMBER: &str = "member";
pub const ALIAS_ANNOTATION: &str = "annotation";

/// The conventional single-member name, also the repeatable-container
/// bookkeeping member.
pub const VALUE_MEMBER: &str = "value";

/// The default namespace for annotations that never leave the compiler.
pub const INTERNAL_PREFIX: &str = "core.annotation.internal.";

/// Stereotype packages excluded when expanding annotations from a given
/// namespace.
#[derive(Debug, Clone)]
pub struct ExcludedStereotypes {
    /// Prefix of the annotation namespace the exclusion applies to.
    pub annotation_prefix: String,
    /// Stereotype package prefixes that do not propagate for it.
    pub stereotype_packages: Vec<String>,
}

/// The narrow nullability compatibility rule: a `Nonnull`-like stereotype
/// is dropped when its discriminating member carries the disqualifying
/// value. Off by default; enable it only when the target platform needs it.
#[derive(Debug, Clone)]
pub struct NullabilityRule {
    pub annotation: String,
    pub member: String,
    pub disqualifying_variant: String,
}

impl NullabilityRule {
    pub fn disqualifies(&self, value: &AnnotationValue) -> bool {
        if value.name() != self.annotation {
            return false;
        }
        match value.get(&self.member) {
            Some(MemberValue::Enum { variant, .. }) => *variant == self.disqualifying_variant,
            Some(MemberValue::String(variant)) => *variant == self.disqualifying_variant,
            _ => false,
        }
    }
}

/// Well-known names and filtering rules the resolution engine consults.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub alias_marker: String,
    pub aliases_marker: String,
    /// The marker whose occurrences always short-circuit to a no-op.
    pub inherited_marker: String,
    pub scope_marker: String,
    pub default_scope_marker: String,
    /// Annotation names never surfaced in resolved metadata.
    pub internal_annotations: HashSet<String>,
    /// Name prefixes treated like `internal_annotations`.
    pub internal_prefixes: Vec<String>,
    pub excluded_stereotypes: Vec<ExcludedStereotypes>,
    pub nullability: Option<NullabilityRule>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        let mut internal_annotations = HashSet::new();
        internal_annotations.insert(ALIAS_FOR.to_owned());
        internal_annotations.insert(ALIASES.to_owned());
        Self {
            alias_marker: ALIAS_FOR.to_owned(),
            aliases_marker: ALIASES.to_owned(),
            inherited_marker: INHERITED.to_owned(),
            scope_marker: SCOPE.to_owned(),
            default_scope_marker: DEFAULT_SCOPE.to_owned(),
            internal_annotations,
            internal_prefixes: vec![INTERNAL_PREFIX.to_owned()],
            excluded_stereotypes: Vec::new(),
            nullability: None,
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_annotation(mut self, name: impl Into<String>) -> Self {
        self.internal_annotations.insert(name.into());
        self
    }

    pub fn exclude_stereotypes(
        mut self,
        annotation_prefix: impl Into<String>,
        stereotype_packages: Vec<String>,
    ) -> Self {
        self.excluded_stereotypes.push(ExcludedStereotypes {
            annotation_prefix: annotation_prefix.into(),
            stereotype_packages,
        });
        self
    }

    pub fn with_nullability_rule(mut self, rule: NullabilityRule) -> Self {
        self.nullability = Some(rule);
        self
    }

    pub fn is_internal(&self, name: &str) -> bool {
        self.internal_annotations.contains(name)
            || self
                .internal_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Whether `stereotype` must not propagate from `annotation`.
    pub fn is_excluded_stereotype(&self, annotation: &str, stereotype: &str) -> bool {
        self.excluded_stereotypes.iter().any(|rule| {
            annotation.starts_with(rule.annotation_prefix.as_str())
                && rule
                    .stereotype_packages
                    .iter()
                    .any(|package| stereotype.starts_with(package.as_str()))
        })
    }

    pub fn is_disqualified_nullability(&self, value: &AnnotationValue) -> bool {
        self.nullability
            .as_ref()
            .map(|rule| rule.disqualifies(value))
            .unwrap_or(false)
    }
}
