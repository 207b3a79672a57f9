use smallvec::SmallVec;

/// Transient per-branch state threaded through the recursive pipeline.
///
/// Immutable: descending into a stereotype or a plugin-produced value works
/// on a copy (`with_parent`, `with_processed_visitor`), so sibling branches
/// never observe each other's state. The ancestor chain doubles as the
/// stereotype parent route and as the cycle guard that keeps mutually
/// meta-annotated annotations from recursing forever.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    ancestors: SmallVec<[String; 4]>,
    processed_visitors: SmallVec<[String; 2]>,
}

impl ProcessingContext {
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this context is at the top level (no enclosing annotation).
    pub fn is_root(&self) -> bool {
        self.ancestors.is_empty()
    }

    pub fn is_ancestor(&self, annotation: &str) -> bool {
        self.ancestors.iter().any(|a| a == annotation)
    }

    /// Ancestor annotation names from the top-level annotation down to the
    /// direct parent.
    pub fn parent_route(&self) -> &[String] {
        &self.ancestors
    }

    pub fn with_parent(&self, annotation: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.ancestors.push(annotation.into());
        next
    }

    pub fn has_processed(&self, visitor: &str) -> bool {
        self.processed_visitors.iter().any(|v| v == visitor)
    }

    /// Mark a plugin as applied on this branch so it cannot fire again on
    /// its own output.
    pub fn with_processed_visitor(&self, visitor: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.processed_visitors.push(visitor.into());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_copies_do_not_leak_into_siblings() {
        let root = ProcessingContext::root();
        let left = root.with_parent("app.A");
        let right = root.with_parent("app.B");
        assert!(left.is_ancestor("app.A"));
        assert!(!left.is_ancestor("app.B"));
        assert!(right.is_ancestor("app.B"));
        assert!(root.is_root());
        assert!(!left.is_root());
    }

    #[test]
    fn test_parent_route_preserves_descent_order() {
        let ctx = ProcessingContext::root()
            .with_parent("app.A")
            .with_parent("app.B");
        assert_eq!(ctx.parent_route(), ["app.A".to_owned(), "app.B".to_owned()]);
    }

    #[test]
    fn test_processed_visitors_accumulate() {
        let ctx = ProcessingContext::root().with_processed_visitor("mapper-1");
        assert!(ctx.has_processed("mapper-1"));
        assert!(!ctx.has_processed("mapper-2"));
    }
}
