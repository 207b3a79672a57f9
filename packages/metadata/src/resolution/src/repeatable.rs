use crate::metadata::{AnnotationValue, MemberValue};

use super::config::VALUE_MEMBER;

/// Detect an explicit repeatable-container form: a value whose only member
/// is a `value` array of occurrences of one repeatable annotation type for
/// which `container_of` names this value's own type.
///
/// Returns the container stripped of its `value` bookkeeping (it keeps its
/// identity for its own stereotypes) together with the individual
/// occurrences.
pub(crate) fn repeatable_split<F>(
    value: &AnnotationValue,
    container_of: F,
) -> Option<(AnnotationValue, Vec<AnnotationValue>)>
where
    F: Fn(&str) -> Option<String>,
{
    if value.values().len() != 1 {
        return None;
    }
    let (member, entries) = value.values().first()?;
    if member != VALUE_MEMBER {
        return None;
    }
    let MemberValue::Array(entries) = entries else {
        return None;
    };
    if entries.is_empty() {
        return None;
    }

    let mut occurrences = Vec::with_capacity(entries.len());
    let mut repeatable: Option<&str> = None;
    for entry in entries {
        let MemberValue::Annotation(occurrence) = entry else {
            return None;
        };
        match repeatable {
            None => repeatable = Some(occurrence.name()),
            Some(name) if name == occurrence.name() => {}
            Some(_) => return None,
        }
        occurrences.push((**occurrence).clone());
    }

    let container = container_of(repeatable?)?;
    if container != value.name() {
        return None;
    }

    let mut stripped = value.values().clone();
    stripped.shift_remove(VALUE_MEMBER);
    let container_value = value.clone().into_builder().members(stripped).build();
    Some((container_value, occurrences))
}
