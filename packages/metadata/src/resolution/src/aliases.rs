use indexmap::IndexMap;

use crate::diagnostics::MetadataError;
use crate::metadata::{AnnotationValue, MemberValue};
use crate::reflection::AnnotationDeclaration;

use super::config::{BuilderConfig, ALIAS_ANNOTATION, ALIAS_MEMBER, VALUE_MEMBER};

/// One parsed alias marker: the target member, on the same annotation when
/// `annotation` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasTarget {
    annotation: Option<String>,
    member: String,
}

fn parse_target(
    owner: &str,
    values: &IndexMap<String, MemberValue>,
) -> Result<AliasTarget, MetadataError> {
    let member = values
        .get(ALIAS_MEMBER)
        .and_then(MemberValue::as_str)
        .ok_or_else(|| MetadataError::InvalidAlias {
            annotation: owner.to_owned(),
            detail: "alias marker names no target member".to_owned(),
        })?;
    let annotation = values
        .get(ALIAS_ANNOTATION)
        .and_then(MemberValue::as_str)
        .map(str::to_owned);
    Ok(AliasTarget {
        annotation,
        member: member.to_owned(),
    })
}

fn alias_targets(
    config: &BuilderConfig,
    owner: &str,
    member_annotations: &[crate::reflection::RawAnnotation],
) -> Result<Vec<AliasTarget>, MetadataError> {
    let mut targets = Vec::new();
    for marker in member_annotations {
        if marker.type_name == config.alias_marker {
            targets.push(parse_target(owner, &marker.values)?);
        } else if marker.type_name == config.aliases_marker {
            // plural form: value = [@AliasFor, @AliasFor, ...]
            if let Some(MemberValue::Array(items)) = marker.values.get(VALUE_MEMBER) {
                for item in items {
                    if let MemberValue::Annotation(nested) = item {
                        targets.push(parse_target(owner, nested.values())?);
                    }
                }
            }
        }
    }
    Ok(targets)
}

/// Apply every alias marker declared on the set members of `value`.
///
/// Same-annotation aliases rename the member in place. Cross-annotation
/// aliases synthesize a new one-member annotation value, returned for the
/// caller to fold into the current value's stereotypes; synthesized values
/// carry computed-empty stereotypes so native meta-annotation extraction is
/// not repeated for them.
pub(crate) fn resolve_aliases(
    config: &BuilderConfig,
    value: AnnotationValue,
    declaration: Option<&AnnotationDeclaration>,
) -> Result<(AnnotationValue, Vec<AnnotationValue>), MetadataError> {
    let Some(declaration) = declaration else {
        return Ok((value, Vec::new()));
    };

    let mut renames: Vec<(String, String)> = Vec::new();
    let mut introduced: Vec<AnnotationValue> = Vec::new();
    for member in &declaration.members {
        let Some(current) = value.get(&member.name) else {
            continue;
        };
        for target in alias_targets(config, &declaration.name, &member.annotations)? {
            match target.annotation {
                // an alias naming its own annotation is a same-annotation rename
                Some(other) if other != declaration.name => {
                    introduced.push(
                        AnnotationValue::builder(other)
                            .member(&target.member, current.clone())
                            .stereotypes(Vec::new())
                            .build(),
                    );
                }
                _ => {
                    if target.member != member.name {
                        renames.push((member.name.clone(), target.member));
                    }
                }
            }
        }
    }

    if renames.is_empty() {
        return Ok((value, introduced));
    }

    let mut values = value.values().clone();
    for (from, to) in renames {
        if let Some(moved) = values.shift_remove(&from) {
            values.insert(to, moved);
        }
    }
    Ok((value.into_builder().members(values).build(), introduced))
}
