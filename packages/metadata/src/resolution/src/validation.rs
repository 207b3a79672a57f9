use once_cell::sync::Lazy;
use regex::Regex;

use crate::metadata::MemberValue;
use crate::reflection::{ElementId, MemberDeclaration};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\$\{.+\}\s*$").expect("placeholder pattern"));

/// Whether a member value is an unresolved `${...}` property placeholder.
/// Placeholder values are exempt from validation; they are substituted by
/// later machinery outside this subsystem.
pub fn is_unresolved_placeholder(value: &MemberValue) -> bool {
    match value {
        MemberValue::String(s) => PLACEHOLDER.is_match(s),
        MemberValue::Array(items) => items.iter().any(is_unresolved_placeholder),
        _ => false,
    }
}

/// Pluggable validator for annotation member values. A member is validated
/// when its declaration carries constraint annotations; each returned
/// message becomes a compiler diagnostic attached to the element, and
/// resolution continues.
pub trait AnnotatedElementValidator: Send + Sync {
    fn validate(
        &self,
        element: &ElementId,
        annotation_type: &str,
        member: &MemberDeclaration,
        value: &MemberValue,
    ) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(is_unresolved_placeholder(&MemberValue::string(
            "${app.name}"
        )));
        assert!(is_unresolved_placeholder(&MemberValue::string(
            "  ${spaced} "
        )));
        assert!(!is_unresolved_placeholder(&MemberValue::string("plain")));
        assert!(!is_unresolved_placeholder(&MemberValue::string("${}")));
        assert!(!is_unresolved_placeholder(&MemberValue::Int(3)));
    }

    #[test]
    fn test_placeholder_detection_descends_into_arrays() {
        let array = MemberValue::Array(vec![
            MemberValue::string("ok"),
            MemberValue::string("${pending}"),
        ]);
        assert!(is_unresolved_placeholder(&array));
    }
}
