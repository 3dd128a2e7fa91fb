//! Lucene 쿼리 백엔드
//!
//! detection 블록을 Lucene 쿼리 문자열로 렌더링합니다. 필드명은
//! 생성 시점에 주입된 [`FieldPipeline`]으로 정규화됩니다.
//!
//! # 렌더링 규칙
//!
//! - predicate: `field:value` (특수문자 이스케이프)
//! - `|contains` -> `field:*value*`, `|startswith` -> `field:value*`,
//!   `|endswith` -> `field:*value`
//! - `|re` -> `field:/regex/`
//! - `|gt`/`|gte`/`|lt`/`|lte` -> `field:>n` 형태의 범위 비교
//! - null 값 -> `(NOT _exists_:field)`, `|exists` -> `_exists_:field`
//! - 값 리스트는 OR (|all 수정자 시 AND)로 결합
//!
//! 표현 불가능한 구성(집계 condition, base64 계열 수정자 등)은
//! [`SigmaError::Unsupported`]로 거부되며, 호출측 오케스트레이터가
//! convert 단계 실패로 집계합니다.

use std::collections::HashMap;

use crate::condition::{glob_match, parse_condition, ConditionExpr, OfPattern};
use crate::error::SigmaError;
use crate::pipeline::FieldPipeline;
use crate::rule::{
    FieldValue, MatchOp, Predicate, PredicateGroup, RuleCollection, Selection, SigmaRule,
};

use super::siem::SiemRule;

/// Lucene 쿼리 백엔드
///
/// 파이프라인 하나에 바인딩되어 규칙 컬렉션을 SIEM 문서 목록으로
/// 컴파일합니다. 규칙 하나는 condition 항목 수만큼 문서를 냅니다.
#[derive(Debug, Clone)]
pub struct LuceneBackend {
    pipeline: FieldPipeline,
}

impl LuceneBackend {
    /// 파이프라인에 바인딩된 백엔드를 생성합니다.
    pub fn new(pipeline: FieldPipeline) -> Self {
        Self { pipeline }
    }

    /// 바인딩된 파이프라인을 반환합니다.
    pub fn pipeline(&self) -> &FieldPipeline {
        &self.pipeline
    }

    /// 컬렉션의 모든 규칙을 SIEM 문서로 컴파일합니다.
    ///
    /// # Errors
    /// 규칙 하나라도 컴파일에 실패하면 전체 호출이 실패합니다.
    /// 규칙 단위 복구는 호출자(오케스트레이터)의 몫입니다.
    pub fn convert(
        &self,
        collection: &RuleCollection,
        index_patterns: &[String],
    ) -> Result<Vec<SiemRule>, SigmaError> {
        let mut documents = Vec::new();
        for rule in collection.rules() {
            for query in self.convert_rule(rule)? {
                documents.push(SiemRule::from_rule(rule, query, index_patterns.to_vec()));
            }
        }
        Ok(documents)
    }

    /// 규칙 하나를 condition 항목별 쿼리 문자열로 컴파일합니다.
    pub fn convert_rule(&self, rule: &SigmaRule) -> Result<Vec<String>, SigmaError> {
        let mut rendered: HashMap<&str, String> = HashMap::new();
        for selection in &rule.detection.selections {
            rendered.insert(selection.name.as_str(), self.render_selection(selection, rule)?);
        }

        let mut queries = Vec::with_capacity(rule.detection.conditions.len());
        for condition in &rule.detection.conditions {
            let ast = parse_condition(condition).map_err(|reason| SigmaError::Condition {
                rule: rule.title.clone(),
                reason,
            })?;
            queries.push(self.render_expr(&ast, &rendered, rule)?);
        }
        Ok(queries)
    }

    fn render_expr(
        &self,
        expr: &ConditionExpr,
        rendered: &HashMap<&str, String>,
        rule: &SigmaRule,
    ) -> Result<String, SigmaError> {
        match expr {
            ConditionExpr::Selection(name) => {
                rendered
                    .get(name.as_str())
                    .cloned()
                    .ok_or_else(|| SigmaError::Condition {
                        rule: rule.title.clone(),
                        reason: format!("unknown selection '{name}'"),
                    })
            }
            ConditionExpr::Not(inner) => {
                let inner = self.render_expr(inner, rendered, rule)?;
                Ok(format!("(NOT {inner})"))
            }
            ConditionExpr::And(terms) => {
                let parts = terms
                    .iter()
                    .map(|t| self.render_expr(t, rendered, rule))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_terms(parts, " AND "))
            }
            ConditionExpr::Or(terms) => {
                let parts = terms
                    .iter()
                    .map(|t| self.render_expr(t, rendered, rule))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_terms(parts, " OR "))
            }
            ConditionExpr::OfAll(pattern) => {
                self.render_of(pattern, " AND ", rendered, rule)
            }
            ConditionExpr::OfAny(pattern) => self.render_of(pattern, " OR ", rendered, rule),
        }
    }

    fn render_of(
        &self,
        pattern: &OfPattern,
        joiner: &str,
        rendered: &HashMap<&str, String>,
        rule: &SigmaRule,
    ) -> Result<String, SigmaError> {
        // 선언 순서 유지 (쿼리 출력 결정성)
        let matched: Vec<String> = rule
            .detection
            .selections
            .iter()
            .filter(|s| match pattern {
                OfPattern::Them => true,
                OfPattern::Glob(glob) => glob_match(glob, &s.name),
            })
            .filter_map(|s| rendered.get(s.name.as_str()).cloned())
            .collect();

        if matched.is_empty() {
            let shown = match pattern {
                OfPattern::Them => "them".to_owned(),
                OfPattern::Glob(glob) => glob.clone(),
            };
            return Err(SigmaError::Condition {
                rule: rule.title.clone(),
                reason: format!("no selection matches pattern '{shown}'"),
            });
        }

        Ok(join_terms(matched, joiner))
    }

    fn render_selection(
        &self,
        selection: &Selection,
        rule: &SigmaRule,
    ) -> Result<String, SigmaError> {
        let groups = selection
            .groups
            .iter()
            .map(|g| self.render_group(g, rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(join_terms(groups, " OR "))
    }

    fn render_group(&self, group: &PredicateGroup, rule: &SigmaRule) -> Result<String, SigmaError> {
        let predicates = group
            .predicates
            .iter()
            .map(|p| self.render_predicate(p, rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(join_terms(predicates, " AND "))
    }

    fn render_predicate(&self, predicate: &Predicate, rule: &SigmaRule) -> Result<String, SigmaError> {
        if !predicate.modifiers.unsupported.is_empty() {
            return Err(SigmaError::Unsupported {
                rule: rule.title.clone(),
                construct: format!(
                    "field modifier '{}'",
                    predicate.modifiers.unsupported.join("|")
                ),
            });
        }

        let field = self.pipeline.normalize(&predicate.field);

        match predicate.op {
            MatchOp::Exists => render_exists(field, predicate, rule),
            MatchOp::Gt | MatchOp::Gte | MatchOp::Lt | MatchOp::Lte => {
                render_range(field, predicate, rule)
            }
            _ => {
                let terms = predicate
                    .values
                    .iter()
                    .map(|v| render_value_term(field, predicate.op, v, rule))
                    .collect::<Result<Vec<_>, _>>()?;
                let joiner = if predicate.modifiers.all_values {
                    " AND "
                } else {
                    " OR "
                };
                Ok(join_terms(terms, joiner))
            }
        }
    }
}

fn render_exists(field: &str, predicate: &Predicate, rule: &SigmaRule) -> Result<String, SigmaError> {
    match predicate.values.as_slice() {
        [FieldValue::Bool(true)] => Ok(format!("_exists_:{field}")),
        [FieldValue::Bool(false)] => Ok(format!("(NOT _exists_:{field})")),
        _ => Err(SigmaError::Unsupported {
            rule: rule.title.clone(),
            construct: format!("'{field}|exists' requires a single boolean value"),
        }),
    }
}

fn render_range(field: &str, predicate: &Predicate, rule: &SigmaRule) -> Result<String, SigmaError> {
    let operator = match predicate.op {
        MatchOp::Gt => ">",
        MatchOp::Gte => ">=",
        MatchOp::Lt => "<",
        MatchOp::Lte => "<=",
        _ => {
            return Err(SigmaError::Condition {
                rule: rule.title.clone(),
                reason: "range rendering on non-range operator".to_owned(),
            });
        }
    };

    match predicate.values.as_slice() {
        [FieldValue::Int(n)] => Ok(format!("{field}:{operator}{n}")),
        [FieldValue::Float(n)] => Ok(format!("{field}:{operator}{n}")),
        _ => Err(SigmaError::Unsupported {
            rule: rule.title.clone(),
            construct: format!("'{field}' range comparison requires a single numeric value"),
        }),
    }
}

fn render_value_term(
    field: &str,
    op: MatchOp,
    value: &FieldValue,
    rule: &SigmaRule,
) -> Result<String, SigmaError> {
    match value {
        FieldValue::Null => match op {
            MatchOp::Equals => Ok(format!("(NOT _exists_:{field})")),
            _ => Err(SigmaError::Unsupported {
                rule: rule.title.clone(),
                construct: format!("null value with non-equals operator on '{field}'"),
            }),
        },
        FieldValue::Bool(b) => Ok(format!("{field}:{b}")),
        FieldValue::Int(n) => render_scalar_text(field, op, &n.to_string(), rule),
        FieldValue::Float(n) => render_scalar_text(field, op, &n.to_string(), rule),
        FieldValue::Str(s) => render_scalar_text(field, op, s, rule),
    }
}

fn render_scalar_text(
    field: &str,
    op: MatchOp,
    raw: &str,
    rule: &SigmaRule,
) -> Result<String, SigmaError> {
    match op {
        MatchOp::Equals => {
            if raw.contains('*') || raw.contains('?') {
                Ok(format!("{field}:{}", escape_wildcard_term(raw)))
            } else if raw.chars().any(char::is_whitespace) {
                Ok(format!("{field}:{}", quote(raw)))
            } else if raw.is_empty() {
                Ok(format!("{field}:\"\""))
            } else {
                Ok(format!("{field}:{}", escape_literal(raw)))
            }
        }
        MatchOp::Contains => Ok(format!("{field}:*{}*", escape_wildcard_term(raw))),
        MatchOp::StartsWith => Ok(format!("{field}:{}*", escape_wildcard_term(raw))),
        MatchOp::EndsWith => Ok(format!("{field}:*{}", escape_wildcard_term(raw))),
        MatchOp::Regex => {
            // Lucene 정규식 문법 검증 근사치
            regex::Regex::new(raw)?;
            Ok(format!("{field}:/{}/", raw.replace('/', "\\/")))
        }
        _ => Err(SigmaError::Condition {
            rule: rule.title.clone(),
            reason: format!("operator not renderable for '{field}'"),
        }),
    }
}

/// 복수 항목을 구분자로 결합합니다 (단일 항목은 괄호 없이 그대로).
fn join_terms(mut terms: Vec<String>, joiner: &str) -> String {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        format!("({})", terms.join(joiner))
    }
}

/// Lucene 특수문자 집합
const LUCENE_SPECIALS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
];

/// 모든 특수문자와 공백을 이스케이프합니다.
fn escape_literal(raw: &str) -> String {
    escape(raw, false)
}

/// `*`/`?` 와일드카드는 남기고 나머지를 이스케이프합니다.
fn escape_wildcard_term(raw: &str) -> String {
    escape(raw, true)
}

fn escape(raw: &str, keep_wildcards: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let is_wildcard = ch == '*' || ch == '?';
        if (LUCENE_SPECIALS.contains(&ch) && !(keep_wildcards && is_wildcard))
            || ch.is_whitespace()
        {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// 따옴표 구문으로 감쌉니다 (내부 `\`와 `"` 이스케이프).
fn quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ecs_windows, FieldPipeline};
    use crate::rule::RuleCollection;

    fn compile_one(yaml: &str) -> Result<Vec<String>, SigmaError> {
        let collection = RuleCollection::from_yaml(yaml, "test.yml")?;
        let backend = LuceneBackend::new(FieldPipeline::identity());
        backend.convert_rule(&collection.rules()[0])
    }

    fn compile_with(yaml: &str, pipeline: FieldPipeline) -> Vec<String> {
        let collection = RuleCollection::from_yaml(yaml, "test.yml").expect("parse");
        LuceneBackend::new(pipeline)
            .convert_rule(&collection.rules()[0])
            .expect("compile")
    }

    #[test]
    fn compile_simple_selection() {
        let queries = compile_one(
            r#"
title: Simple
id: s1
detection:
  selection:
    process: sshd
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["process:sshd".to_owned()]);
    }

    #[test]
    fn compile_and_within_group() {
        let queries = compile_one(
            r#"
title: Group
id: g1
detection:
  selection:
    a: one
    b: two
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(a:one AND b:two)".to_owned()]);
    }

    #[test]
    fn compile_value_list_is_or() {
        let queries = compile_one(
            r#"
title: List
id: l1
detection:
  selection:
    Image:
      - /bin/nc
      - /bin/ncat
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec!["(Image:\\/bin\\/nc OR Image:\\/bin\\/ncat)".to_owned()]
        );
    }

    #[test]
    fn compile_all_modifier_joins_with_and() {
        let queries = compile_one(
            r#"
title: All
id: a1
detection:
  selection:
    CommandLine|contains|all:
      - curl
      - http
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec!["(CommandLine:*curl* AND CommandLine:*http*)".to_owned()]
        );
    }

    #[test]
    fn compile_wildcard_operators() {
        let queries = compile_one(
            r#"
title: Wildcards
id: w1
detection:
  starts:
    f|startswith: pre
  ends:
    f|endswith: post
  condition: starts or ends
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(f:pre* OR f:*post)".to_owned()]);
    }

    #[test]
    fn compile_equals_keeps_authored_wildcards() {
        let queries = compile_one(
            r#"
title: Authored Wildcard
id: aw1
detection:
  selection:
    Image: C:\Tools\*.exe
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["Image:C\\:\\\\Tools\\\\*.exe".to_owned()]);
    }

    #[test]
    fn compile_equals_quotes_whitespace() {
        let queries = compile_one(
            r#"
title: Spaces
id: sp1
detection:
  selection:
    message: Failed password
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["message:\"Failed password\"".to_owned()]);
    }

    #[test]
    fn compile_regex_predicate() {
        let queries = compile_one(
            r#"
title: Regex
id: r1
detection:
  selection:
    path|re: ^/tmp/[a-z]+$
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["path:/^\\/tmp\\/[a-z]+$/".to_owned()]);
    }

    #[test]
    fn compile_invalid_regex_fails() {
        let result = compile_one(
            r#"
title: Bad Regex
id: r2
detection:
  selection:
    path|re: "["
  condition: selection
"#,
        );
        assert!(matches!(result, Err(SigmaError::Regex(_))));
    }

    #[test]
    fn compile_numeric_ranges() {
        let queries = compile_one(
            r#"
title: Ranges
id: n1
detection:
  big:
    size|gte: 100
  small:
    size|lt: 10
  condition: big or small
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(size:>=100 OR size:<10)".to_owned()]);
    }

    #[test]
    fn compile_null_value_renders_not_exists() {
        let queries = compile_one(
            r#"
title: "Null"
id: nul1
detection:
  selection:
    parent: null
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(NOT _exists_:parent)".to_owned()]);
    }

    #[test]
    fn compile_exists_modifier() {
        let queries = compile_one(
            r#"
title: Exists
id: ex1
detection:
  selection:
    parent|exists: true
  condition: selection
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["_exists_:parent".to_owned()]);
    }

    #[test]
    fn compile_not_condition() {
        let queries = compile_one(
            r#"
title: Not
id: not1
detection:
  selection:
    a: one
  filter:
    b: two
  condition: selection and not filter
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(a:one AND (NOT b:two))".to_owned()]);
    }

    #[test]
    fn compile_of_them_and_glob() {
        let queries = compile_one(
            r#"
title: OfThem
id: of1
detection:
  sel_a:
    a: one
  sel_b:
    b: two
  condition: 1 of sel_*
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(a:one OR b:two)".to_owned()]);

        let queries = compile_one(
            r#"
title: AllOfThem
id: of2
detection:
  sel_a:
    a: one
  sel_b:
    b: two
  condition: all of them
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["(a:one AND b:two)".to_owned()]);
    }

    #[test]
    fn compile_condition_list_yields_one_query_each() {
        let queries = compile_one(
            r#"
title: Two Queries
id: two1
detection:
  sel_a:
    a: one
  sel_b:
    b: two
  condition:
    - sel_a
    - sel_b
"#,
        )
        .unwrap();
        assert_eq!(queries, vec!["a:one".to_owned(), "b:two".to_owned()]);
    }

    #[test]
    fn compile_unknown_selection_fails() {
        let result = compile_one(
            r#"
title: Unknown
id: u1
detection:
  selection:
    a: one
  condition: missing
"#,
        );
        assert!(matches!(result, Err(SigmaError::Condition { .. })));
    }

    #[test]
    fn compile_unsupported_modifier_fails() {
        let result = compile_one(
            r#"
title: Base64
id: b1
detection:
  selection:
    payload|base64offset|contains: secret
  condition: selection
"#,
        );
        match result {
            Err(SigmaError::Unsupported { construct, .. }) => {
                assert!(construct.contains("base64offset"));
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn compile_aggregation_condition_fails() {
        let result = compile_one(
            r#"
title: Aggregation
id: agg1
detection:
  selection:
    a: one
  condition: selection | count() > 5
"#,
        );
        assert!(matches!(result, Err(SigmaError::Condition { .. })));
    }

    #[test]
    fn pipeline_normalizes_field_names() {
        let queries = compile_with(
            r#"
title: Mapped
id: m1
detection:
  selection:
    CommandLine|contains: whoami
  condition: selection
"#,
            ecs_windows(),
        );
        assert_eq!(queries, vec!["process.command_line:*whoami*".to_owned()]);
    }

    #[test]
    fn convert_builds_documents_per_condition() {
        let yaml = r#"
title: Two Docs
id: duo-1
detection:
  sel_a:
    a: one
  sel_b:
    b: two
  condition:
    - sel_a
    - sel_b
"#;
        let collection = RuleCollection::from_yaml(yaml, "duo.yml").unwrap();
        let backend = LuceneBackend::new(FieldPipeline::identity());
        let docs = backend
            .convert(&collection, &["logs-*".to_owned()])
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].rule_id, "duo-1");
        assert_eq!(docs[1].rule_id, "duo-1");
        assert_ne!(docs[0].query, docs[1].query);
        assert_eq!(docs[0].index, vec!["logs-*".to_owned()]);
    }

    #[test]
    fn escape_literal_escapes_specials() {
        assert_eq!(escape_literal("a+b"), "a\\+b");
        assert_eq!(escape_literal("a*b"), "a\\*b");
        assert_eq!(escape_literal("C:\\x"), "C\\:\\\\x");
    }

    #[test]
    fn escape_wildcard_term_keeps_wildcards() {
        assert_eq!(escape_wildcard_term("a*b?c"), "a*b?c");
        assert_eq!(escape_wildcard_term("a:b"), "a\\:b");
        assert_eq!(escape_wildcard_term("a b"), "a\\ b");
    }

    #[test]
    fn compilation_is_idempotent() {
        let yaml = r#"
title: Stable
id: st1
detection:
  selection:
    a: one
    b: two
  condition: selection
"#;
        let collection = RuleCollection::from_yaml(yaml, "st.yml").unwrap();
        let backend = LuceneBackend::new(FieldPipeline::identity());
        let first = backend.convert_rule(&collection.rules()[0]).unwrap();
        let second = backend.convert_rule(&collection.rules()[0]).unwrap();
        assert_eq!(first, second);
    }
}
