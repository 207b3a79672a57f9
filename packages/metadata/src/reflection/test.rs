// Reflection Host Tests
//
// Tests for the in-memory element model.

#[cfg(test)]
mod tests {
    use crate::metadata::MemberValue;
    use crate::reflection::*;

    fn diamond_host() -> InMemoryReflectionHost {
        // D extends B, C; B and C both extend A.
        let mut host = InMemoryReflectionHost::new();
        host.register(ElementRegistration::class("app.A"));
        host.register(ElementRegistration::class("app.B").extends("app.A"));
        host.register(ElementRegistration::class("app.C").extends("app.A"));
        host.register(
            ElementRegistration::class("app.D")
                .extends("app.B")
                .extends("app.C"),
        );
        host
    }

    #[test]
    fn test_hierarchy_is_self_first_and_deduplicated() {
        let host = diamond_host();
        let hierarchy = host
            .type_hierarchy_of(&ElementId::from("app.D"), true, false)
            .unwrap();
        let names: Vec<&str> = hierarchy.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, vec!["app.D", "app.B", "app.A", "app.C"]);
    }

    #[test]
    fn test_declared_only_hierarchy_is_just_the_element() {
        let host = diamond_host();
        let hierarchy = host
            .type_hierarchy_of(&ElementId::from("app.D"), true, true)
            .unwrap();
        assert_eq!(hierarchy, vec![ElementId::from("app.D")]);
    }

    #[test]
    fn test_unregistered_element_has_no_annotations() {
        let host = InMemoryReflectionHost::new();
        let annotations = host
            .annotations_of(&ElementId::from("app.Missing"))
            .unwrap();
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_annotations_preserve_declaration_order() {
        let mut host = InMemoryReflectionHost::new();
        host.register(
            ElementRegistration::method("app.A::run()")
                .annotated(RawAnnotation::new("app.First").member("value", "a"))
                .annotated(RawAnnotation::new("app.Second")),
        );
        let annotations = host
            .annotations_of(&ElementId::from("app.A::run()"))
            .unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].type_name, "app.First");
        assert_eq!(
            annotations[0].values.get("value"),
            Some(&MemberValue::string("a"))
        );
        assert_eq!(annotations[1].type_name, "app.Second");
    }

    #[test]
    fn test_declaration_lookup_misses_for_unknown_types() {
        let mut host = InMemoryReflectionHost::new();
        host.register_declaration(AnnotationDeclaration::new("app.Known"));
        assert!(host.annotation_declaration("app.Known").is_some());
        assert!(host.annotation_declaration("app.Unknown").is_none());
    }
}
