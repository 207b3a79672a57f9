use crate::metadata::AnnotationValue;

/// Additive extension: contributes extra annotation values alongside the
/// original. The original value is always retained regardless of what the
/// mapper emits.
///
/// Emitted values re-enter the resolution pipeline with this mapper marked
/// as already applied, so a mapper re-emitting its own trigger annotation
/// terminates.
pub trait AnnotationMapper: Send + Sync {
    /// Process-unique identifier, used to guard against a mapper firing
    /// twice on its own output.
    fn name(&self) -> &str;

    /// The exact annotation type name this mapper fires on.
    fn annotation_type(&self) -> &str;

    fn map(&self, value: &AnnotationValue) -> Vec<AnnotationValue>;
}

/// Substitutive extension scoped to a package: replaces an annotation
/// value's identity entirely for every annotation in its package.
///
/// Returning the input unchanged keeps it; returning anything else replaces
/// the original (including dropping it via an empty result).
pub trait AnnotationRemapper: Send + Sync {
    fn name(&self) -> &str;

    /// The package this remapper applies to. `"*"` applies to every
    /// package.
    fn package_name(&self) -> &str;

    fn remap(&self, value: &AnnotationValue) -> Vec<AnnotationValue>;
}

/// Substitutive extension keyed by exact annotation type name. Same
/// replacement semantics as [`AnnotationRemapper`], narrower scope.
pub trait AnnotationTransformer: Send + Sync {
    fn name(&self) -> &str;

    fn annotation_type(&self) -> &str;

    fn transform(&self, value: &AnnotationValue) -> Vec<AnnotationValue>;
}

/// Remapper package wildcard.
pub const ALL_PACKAGES: &str = "*";
