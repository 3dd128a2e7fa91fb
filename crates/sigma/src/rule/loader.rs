//! 규칙 YAML 로더 -- YAML 텍스트를 규칙 컬렉션으로 파싱합니다.
//!
//! 하나의 파일은 멀티 문서 YAML 스트림일 수 있으며, 문서마다 규칙
//! 하나가 생성됩니다. 빈 문서는 건너뜁니다.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::SigmaError;

use super::types::{
    parse_field_key, Detection, FieldValue, Logsource, Predicate, PredicateGroup, Selection,
    SigmaRule,
};

/// 파싱된 규칙 컬렉션
///
/// 파일 하나에서 나온 규칙들, 혹은 컴파일 호출을 위해 만든
/// 단일 규칙 컬렉션을 나타냅니다.
#[derive(Debug, Clone, Default)]
pub struct RuleCollection {
    rules: Vec<SigmaRule>,
}

impl RuleCollection {
    /// YAML 텍스트에서 규칙 컬렉션을 파싱합니다.
    ///
    /// `source_name`은 에러 메시지에 사용되는 출처 라벨입니다
    /// (보통 파일 경로).
    ///
    /// # Errors
    /// - YAML 문법 오류, 문서가 규칙 스키마에 맞지 않는 경우
    /// - 규칙 구조 검증 실패 ([`SigmaRule::validate`])
    /// - 스트림에 규칙 문서가 하나도 없는 경우
    pub fn from_yaml(text: &str, source_name: &str) -> Result<Self, SigmaError> {
        let mut rules = Vec::new();

        for document in serde_yaml::Deserializer::from_str(text) {
            let value = Value::deserialize(document).map_err(|e| SigmaError::Parse {
                source_name: source_name.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;

            if value.is_null() {
                continue;
            }

            let rule = build_rule(value, source_name)?;
            rule.validate()?;
            rules.push(rule);
        }

        if rules.is_empty() {
            return Err(SigmaError::Parse {
                source_name: source_name.to_owned(),
                reason: "no rule documents found".to_owned(),
            });
        }

        tracing::debug!(source = source_name, rules = rules.len(), "parsed rule collection");
        Ok(Self { rules })
    }

    /// 단일 규칙으로 컬렉션을 만듭니다 (컴파일 호출용).
    pub fn single(rule: SigmaRule) -> Self {
        Self { rules: vec![rule] }
    }

    /// 규칙 목록을 반환합니다.
    pub fn rules(&self) -> &[SigmaRule] {
        &self.rules
    }

    /// 규칙 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 컬렉션이 비어 있는지 여부를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 규칙 목록의 소유권을 가져갑니다.
    pub fn into_rules(self) -> Vec<SigmaRule> {
        self.rules
    }
}

/// 작성자 필드 -- 스칼라와 리스트 표기를 모두 허용합니다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    One(String),
    Many(Vec<String>),
}

impl AuthorField {
    fn into_list(self) -> Vec<String> {
        match self {
            Self::One(author) => vec![author],
            Self::Many(authors) => authors,
        }
    }
}

/// YAML 문서의 원시 스키마
///
/// detection 블록은 구조가 자유로워 [`Value`]로 받은 뒤
/// [`parse_detection`]에서 정규화합니다.
#[derive(Debug, Deserialize)]
struct RawRule {
    title: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: Option<AuthorField>,
    #[serde(default)]
    references: Vec<String>,
    #[serde(default)]
    logsource: Logsource,
    detection: Value,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, rename = "falsepositives")]
    false_positives: Vec<String>,
}

fn build_rule(value: Value, source_name: &str) -> Result<SigmaRule, SigmaError> {
    let raw: RawRule = serde_yaml::from_value(value).map_err(|e| SigmaError::Parse {
        source_name: source_name.to_owned(),
        reason: format!("rule schema error: {e}"),
    })?;

    let detection = parse_detection(&raw.detection, &raw.title)?;

    Ok(SigmaRule {
        title: raw.title,
        id: raw.id.trim().to_owned(),
        status: raw.status,
        description: raw.description,
        author: raw.author.map(AuthorField::into_list).unwrap_or_default(),
        references: raw.references,
        logsource: raw.logsource,
        detection,
        level: raw.level,
        tags: raw.tags,
        false_positives: raw.false_positives,
    })
}

/// detection 블록을 정규화합니다.
///
/// 매핑 selection은 그룹 하나(AND), 매핑 리스트 selection은
/// 그룹들의 OR입니다. `condition` 키는 문자열 또는 문자열 리스트를
/// 허용합니다.
fn parse_detection(value: &Value, rule: &str) -> Result<Detection, SigmaError> {
    let Value::Mapping(map) = value else {
        return Err(SigmaError::Validation {
            rule: rule.to_owned(),
            reason: "detection must be a mapping".to_owned(),
        });
    };

    let mut selections = Vec::new();
    let mut conditions = Vec::new();

    for (key, entry) in map {
        let Some(name) = key.as_str() else {
            return Err(SigmaError::Validation {
                rule: rule.to_owned(),
                reason: "detection keys must be strings".to_owned(),
            });
        };

        if name == "condition" {
            conditions = parse_conditions(entry, rule)?;
            continue;
        }

        selections.push(parse_selection(name, entry, rule)?);
    }

    Ok(Detection {
        selections,
        conditions,
    })
}

fn parse_conditions(value: &Value, rule: &str) -> Result<Vec<String>, SigmaError> {
    match value {
        Value::String(condition) => Ok(vec![condition.clone()]),
        Value::Sequence(items) => {
            let mut conditions = Vec::with_capacity(items.len());
            for item in items {
                let Some(condition) = item.as_str() else {
                    return Err(SigmaError::Validation {
                        rule: rule.to_owned(),
                        reason: "condition list entries must be strings".to_owned(),
                    });
                };
                conditions.push(condition.to_owned());
            }
            Ok(conditions)
        }
        _ => Err(SigmaError::Validation {
            rule: rule.to_owned(),
            reason: "condition must be a string or list of strings".to_owned(),
        }),
    }
}

fn parse_selection(name: &str, value: &Value, rule: &str) -> Result<Selection, SigmaError> {
    let groups = match value {
        Value::Mapping(map) => vec![parse_group(map, name, rule)?],
        Value::Sequence(items) => {
            let mut groups = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let Value::Mapping(map) = item else {
                    return Err(SigmaError::Validation {
                        rule: rule.to_owned(),
                        reason: format!("selection '{name}' item {index} is not a mapping"),
                    });
                };
                groups.push(parse_group(map, name, rule)?);
            }
            groups
        }
        _ => {
            return Err(SigmaError::Validation {
                rule: rule.to_owned(),
                reason: format!("selection '{name}' must be a mapping or list of mappings"),
            });
        }
    };

    Ok(Selection {
        name: name.to_owned(),
        groups,
    })
}

fn parse_group(
    map: &serde_yaml::Mapping,
    selection: &str,
    rule: &str,
) -> Result<PredicateGroup, SigmaError> {
    let mut predicates = Vec::with_capacity(map.len());

    for (key, entry) in map {
        let Some(raw_key) = key.as_str() else {
            return Err(SigmaError::Validation {
                rule: rule.to_owned(),
                reason: format!("selection '{selection}' field keys must be strings"),
            });
        };

        let (field, op, modifiers) = parse_field_key(raw_key);
        if field.is_empty() {
            return Err(SigmaError::Validation {
                rule: rule.to_owned(),
                reason: format!("selection '{selection}' has an empty field name"),
            });
        }

        let values = parse_values(entry, selection, rule)?;

        predicates.push(Predicate {
            field,
            op,
            values,
            modifiers,
        });
    }

    Ok(PredicateGroup { predicates })
}

fn parse_values(value: &Value, selection: &str, rule: &str) -> Result<Vec<FieldValue>, SigmaError> {
    match value {
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(SigmaError::Validation {
                    rule: rule.to_owned(),
                    reason: format!("selection '{selection}' has an empty value list"),
                });
            }
            items
                .iter()
                .map(|item| scalar_value(item, selection, rule))
                .collect()
        }
        _ => Ok(vec![scalar_value(value, selection, rule)?]),
    }
}

fn scalar_value(value: &Value, selection: &str, rule: &str) -> Result<FieldValue, SigmaError> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Bool(b) => Ok(FieldValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(FieldValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(FieldValue::Float(f))
            } else {
                Err(SigmaError::Validation {
                    rule: rule.to_owned(),
                    reason: format!("selection '{selection}' has an unrepresentable number"),
                })
            }
        }
        Value::String(s) => Ok(FieldValue::Str(s.clone())),
        _ => Err(SigmaError::Validation {
            rule: rule.to_owned(),
            reason: format!("selection '{selection}' values must be scalars"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::types::MatchOp;

    #[test]
    fn parse_valid_rule() {
        let yaml = r#"
title: Suspicious Curl Usage
id: 3B8E5F3D-AAAA-BBBB-CCCC-000000000001
logsource:
  product: linux
  category: process_creation
detection:
  selection:
    Image|endswith: /curl
    CommandLine|contains: http
  condition: selection
level: medium
tags:
  - attack.execution
"#;
        let collection = RuleCollection::from_yaml(yaml, "test.yml").unwrap();
        assert_eq!(collection.len(), 1);

        let rule = &collection.rules()[0];
        assert_eq!(rule.title, "Suspicious Curl Usage");
        assert_eq!(rule.logsource.product_norm(), "linux");
        assert_eq!(rule.detection.selections.len(), 1);
        assert_eq!(rule.detection.conditions, vec!["selection".to_owned()]);

        let selection = rule.detection.selection("selection").unwrap();
        assert_eq!(selection.groups.len(), 1);
        assert_eq!(selection.groups[0].predicates.len(), 2);
    }

    #[test]
    fn parse_invalid_yaml_returns_error() {
        let result = RuleCollection::from_yaml("not: [valid: yaml: {{{", "bad.yml");
        assert!(matches!(result, Err(SigmaError::Parse { .. })));
    }

    #[test]
    fn parse_missing_detection_returns_error() {
        let yaml = "title: No Detection Here\nid: abc\n";
        let result = RuleCollection::from_yaml(yaml, "no_detection.yml");
        assert!(matches!(result, Err(SigmaError::Parse { .. })));
    }

    #[test]
    fn parse_empty_stream_returns_error() {
        let result = RuleCollection::from_yaml("---\n", "empty.yml");
        assert!(result.is_err());
    }

    #[test]
    fn parse_multi_document_stream() {
        let yaml = r#"
title: First
id: id-one
logsource:
  product: windows
detection:
  selection:
    EventID: 4625
  condition: selection
---
title: Second
id: id-two
logsource:
  product: linux
detection:
  selection:
    Image: /bin/nc
  condition: selection
"#;
        let collection = RuleCollection::from_yaml(yaml, "multi.yml").unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.rules()[0].id, "id-one");
        assert_eq!(collection.rules()[1].id, "id-two");
    }

    #[test]
    fn parse_selection_list_of_mappings_becomes_or_groups() {
        let yaml = r#"
title: OR Groups
id: or-groups
detection:
  selection:
    - Image|endswith: /wget
    - Image|endswith: /curl
  condition: selection
"#;
        let collection = RuleCollection::from_yaml(yaml, "or.yml").unwrap();
        let rule = &collection.rules()[0];
        let selection = rule.detection.selection("selection").unwrap();
        assert_eq!(selection.groups.len(), 2);
    }

    #[test]
    fn parse_condition_list_yields_multiple_conditions() {
        let yaml = r#"
title: Two Conditions
id: two-conditions
detection:
  selection_a:
    EventID: 1
  selection_b:
    EventID: 2
  condition:
    - selection_a
    - selection_b
"#;
        let collection = RuleCollection::from_yaml(yaml, "two.yml").unwrap();
        assert_eq!(collection.rules()[0].detection.conditions.len(), 2);
    }

    #[test]
    fn parse_author_scalar_and_list() {
        let scalar = r#"
title: Scalar Author
id: a1
author: one analyst
detection:
  selection:
    EventID: 1
  condition: selection
"#;
        let list = r#"
title: List Author
id: a2
author:
  - one
  - two
detection:
  selection:
    EventID: 1
  condition: selection
"#;
        let one = RuleCollection::from_yaml(scalar, "a1.yml").unwrap();
        assert_eq!(one.rules()[0].author, vec!["one analyst".to_owned()]);

        let two = RuleCollection::from_yaml(list, "a2.yml").unwrap();
        assert_eq!(two.rules()[0].author.len(), 2);
    }

    #[test]
    fn parse_value_types() {
        let yaml = r#"
title: Value Types
id: vt
detection:
  selection:
    EventID: 4688
    Enabled: true
    Score: 1.5
    Missing: null
    Names:
      - alpha
      - beta
  condition: selection
"#;
        let collection = RuleCollection::from_yaml(yaml, "vt.yml").unwrap();
        let group = &collection.rules()[0].detection.selections[0].groups[0];

        let by_field = |name: &str| {
            group
                .predicates
                .iter()
                .find(|p| p.field == name)
                .unwrap()
                .clone()
        };

        assert_eq!(by_field("EventID").values, vec![FieldValue::Int(4688)]);
        assert_eq!(by_field("Enabled").values, vec![FieldValue::Bool(true)]);
        assert_eq!(by_field("Score").values, vec![FieldValue::Float(1.5)]);
        assert_eq!(by_field("Missing").values, vec![FieldValue::Null]);
        assert_eq!(by_field("Names").values.len(), 2);
        assert_eq!(by_field("Names").op, MatchOp::Equals);
    }

    #[test]
    fn parse_rejects_nested_mapping_value() {
        let yaml = r#"
title: Nested Value
id: nv
detection:
  selection:
    Field:
      nested: true
  condition: selection
"#;
        let result = RuleCollection::from_yaml(yaml, "nv.yml");
        assert!(matches!(result, Err(SigmaError::Validation { .. })));
    }

    #[test]
    fn single_collection_wraps_one_rule() {
        let yaml = r#"
title: Wrapped
id: w1
detection:
  selection:
    EventID: 1
  condition: selection
"#;
        let collection = RuleCollection::from_yaml(yaml, "w.yml").unwrap();
        let rule = collection.rules()[0].clone();
        let single = RuleCollection::single(rule);
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }
}
