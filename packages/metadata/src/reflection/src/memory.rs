use std::collections::{HashMap, HashSet};

use super::api::{
    AnnotationDeclaration, ElementId, ElementKind, HostError, RawAnnotation, ReflectionHost,
};

#[derive(Debug, Clone)]
struct ElementEntry {
    kind: ElementKind,
    annotations: Vec<RawAnnotation>,
    /// Direct supertypes for classes, overridden members for methods/fields.
    extends: Vec<ElementId>,
}

/// Registration record for one element of the in-memory model.
#[derive(Debug, Clone)]
pub struct ElementRegistration {
    id: ElementId,
    kind: ElementKind,
    annotations: Vec<RawAnnotation>,
    extends: Vec<ElementId>,
}

impl ElementRegistration {
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            annotations: Vec::new(),
            extends: Vec::new(),
        }
    }

    pub fn class(id: impl Into<ElementId>) -> Self {
        Self::new(id, ElementKind::Class)
    }

    pub fn method(id: impl Into<ElementId>) -> Self {
        Self::new(id, ElementKind::Method)
    }

    pub fn field(id: impl Into<ElementId>) -> Self {
        Self::new(id, ElementKind::Field)
    }

    pub fn annotated(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// For a class: a direct supertype. For a method or field: the member it
    /// overrides or hides.
    pub fn extends(mut self, parent: impl Into<ElementId>) -> Self {
        self.extends.push(parent.into());
        self
    }
}

/// Programmatic [`ReflectionHost`] backed by registered elements and
/// annotation declarations. The natural host for embedders that synthesize
/// elements, and the model the engine's own tests run against.
#[derive(Debug, Default)]
pub struct InMemoryReflectionHost {
    elements: HashMap<ElementId, ElementEntry>,
    declarations: HashMap<String, AnnotationDeclaration>,
}

impl InMemoryReflectionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, registration: ElementRegistration) -> &mut Self {
        self.elements.insert(
            registration.id,
            ElementEntry {
                kind: registration.kind,
                annotations: registration.annotations,
                extends: registration.extends,
            },
        );
        self
    }

    pub fn register_declaration(&mut self, declaration: AnnotationDeclaration) -> &mut Self {
        self.declarations
            .insert(declaration.name.clone(), declaration);
        self
    }

    fn walk(&self, id: &ElementId, out: &mut Vec<ElementId>, seen: &mut HashSet<ElementId>) {
        if !seen.insert(id.clone()) {
            return;
        }
        out.push(id.clone());
        if let Some(entry) = self.elements.get(id) {
            for parent in &entry.extends {
                self.walk(parent, out, seen);
            }
        }
    }
}

impl ReflectionHost for InMemoryReflectionHost {
    fn annotations_of(&self, element: &ElementId) -> Result<Vec<RawAnnotation>, HostError> {
        Ok(self
            .elements
            .get(element)
            .map(|e| e.annotations.clone())
            .unwrap_or_default())
    }

    fn type_hierarchy_of(
        &self,
        element: &ElementId,
        inherit_type_annotations: bool,
        declared_only: bool,
    ) -> Result<Vec<ElementId>, HostError> {
        if declared_only {
            return Ok(vec![element.clone()]);
        }
        if !inherit_type_annotations && self.element_kind(element) == ElementKind::Class {
            return Ok(vec![element.clone()]);
        }
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.walk(element, &mut out, &mut seen);
        Ok(out)
    }

    fn element_kind(&self, element: &ElementId) -> ElementKind {
        self.elements
            .get(element)
            .map(|e| e.kind)
            .unwrap_or(ElementKind::Class)
    }

    fn annotation_declaration(&self, type_name: &str) -> Option<AnnotationDeclaration> {
        self.declarations.get(type_name).cloned()
    }
}
