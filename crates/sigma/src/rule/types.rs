//! Sigma 규칙 데이터 타입
//!
//! YAML 규칙 파일에서 역직렬화되는 구조체들을 정의합니다.
//! 탐지 블록은 selection 이름 -> AND 그룹들(OR 결합) 구조로
//! 정규화되어 저장됩니다.

use serde::{Deserialize, Serialize};

use sigmaforge_core::types::Severity;

use crate::error::SigmaError;

/// 규칙 ID 최대 길이
const MAX_RULE_ID_LEN: usize = 256;

/// 로그 소스 메타데이터
///
/// product/service/category 세 필드 모두 선택적이며, 비교는 항상
/// 소문자 정규화를 거칩니다 (누락은 빈 문자열로 취급).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logsource {
    /// 제품 (windows, zeek, kubernetes 등)
    #[serde(default)]
    pub product: Option<String>,
    /// 서비스 (security, sysmon, corelight 등)
    #[serde(default)]
    pub service: Option<String>,
    /// 카테고리 (process_creation, network_connection 등)
    #[serde(default)]
    pub category: Option<String>,
}

impl Logsource {
    /// 소문자로 정규화된 product를 반환합니다 (누락 시 빈 문자열).
    pub fn product_norm(&self) -> String {
        normalize(self.product.as_deref())
    }

    /// 소문자로 정규화된 service를 반환합니다 (누락 시 빈 문자열).
    pub fn service_norm(&self) -> String {
        normalize(self.service.as_deref())
    }

    /// 소문자로 정규화된 category를 반환합니다 (누락 시 빈 문자열).
    pub fn category_norm(&self) -> String {
        normalize(self.category.as_deref())
    }
}

fn normalize(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// 필드 매칭 연산자
///
/// `Field|modifier` 키의 modifier에서 파생됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchOp {
    /// 정확히 일치 (기본값, 값 안의 와일드카드는 유지)
    #[default]
    Equals,
    /// 부분 문자열 포함
    Contains,
    /// 접두사 일치
    StartsWith,
    /// 접미사 일치
    EndsWith,
    /// 정규식 매칭
    Regex,
    /// 필드 존재 여부
    Exists,
    /// 수치 비교
    Gt,
    Gte,
    Lt,
    Lte,
}

/// `Field|mod1|mod2`에서 파생된 수정자 플래그
///
/// `unsupported`에는 이 백엔드가 컴파일할 수 없는 수정자가 원문 그대로
/// 보관됩니다. 파싱은 관대하게 통과시키고, 컴파일 단계에서
/// [`SigmaError::Unsupported`]로 거부됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// 리스트 값 전체가 매칭되어야 함 (any-of 대신 all-of)
    pub all_values: bool,
    /// 대소문자 구분 비교
    pub cased: bool,
    /// 컴파일 불가능한 수정자 원문
    pub unsupported: Vec<String>,
}

/// 매칭 대상 값
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// YAML null — 필드 부재를 의미
    Null,
}

/// 필드 매칭 조건 하나
///
/// 하나의 `Field|modifier: value(s)` 항목에 대응합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// 대상 필드명 (파이프라인 정규화 전)
    pub field: String,
    /// 매칭 연산자
    pub op: MatchOp,
    /// 매칭할 값 목록 (스칼라는 단일 원소)
    pub values: Vec<FieldValue>,
    /// 수정자 플래그
    pub modifiers: Modifiers,
}

/// AND로 결합되는 조건 그룹
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub predicates: Vec<Predicate>,
}

/// 이름 있는 selection
///
/// 매핑 하나는 그룹 하나(AND), 매핑 리스트는 그룹들의 OR입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub name: String,
    pub groups: Vec<PredicateGroup>,
}

/// 탐지 블록
///
/// condition은 문자열 또는 문자열 리스트를 허용하며, 항목마다
/// 독립적인 쿼리 문서가 생성됩니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// 이름 있는 selection 목록 (YAML 등장 순서)
    pub selections: Vec<Selection>,
    /// condition 식 목록
    pub conditions: Vec<String>,
}

impl Detection {
    /// 이름으로 selection을 찾습니다.
    pub fn selection(&self, name: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.name == name)
    }
}

/// Sigma 탐지 규칙 — 하나의 YAML 문서에 대응합니다.
///
/// # YAML 스키마 (발췌)
/// ```yaml
/// title: Suspicious Curl Usage
/// id: 3b8e5f3d-...
/// logsource:
///   product: linux
///   category: process_creation
/// detection:
///   selection:
///     Image|endswith: /curl
///     CommandLine|contains: http
///   condition: selection
/// level: medium
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaRule {
    /// 규칙 제목 (SIEM 문서 이름에 사용)
    pub title: String,
    /// 규칙 고유 ID (없으면 빈 문자열 — 문서 기록 단계에서 거부됨)
    pub id: String,
    /// 규칙 상태 (stable, test, experimental 등)
    pub status: Option<String>,
    /// 규칙 설명
    pub description: String,
    /// 작성자 목록 (YAML의 스칼라/리스트 모두 리스트로 정규화)
    pub author: Vec<String>,
    /// 참고 자료 URL 목록
    pub references: Vec<String>,
    /// 로그 소스 메타데이터
    pub logsource: Logsource,
    /// 탐지 블록
    pub detection: Detection,
    /// 심각도 레벨 원문
    pub level: Option<String>,
    /// 분류 태그
    pub tags: Vec<String>,
    /// 오탐 가능성 노트
    pub false_positives: Vec<String>,
}

impl SigmaRule {
    /// 레벨 문자열을 심각도로 변환합니다.
    ///
    /// 인식할 수 없거나 누락된 레벨은 `Low`입니다.
    pub fn severity(&self) -> Severity {
        self.level
            .as_deref()
            .and_then(Severity::from_str_loose)
            .unwrap_or_default()
    }

    /// 규칙의 구조적 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SigmaError> {
        if self.title.trim().is_empty() {
            return Err(SigmaError::Validation {
                rule: "(untitled)".to_owned(),
                reason: "rule title must not be empty".to_owned(),
            });
        }

        if self.id.len() > MAX_RULE_ID_LEN {
            return Err(SigmaError::Validation {
                rule: self.title.clone(),
                reason: format!("rule id must not exceed {MAX_RULE_ID_LEN} characters"),
            });
        }

        if self.detection.selections.is_empty() {
            return Err(SigmaError::Validation {
                rule: self.title.clone(),
                reason: "detection must define at least one selection".to_owned(),
            });
        }

        for selection in &self.detection.selections {
            if selection.groups.is_empty()
                || selection.groups.iter().any(|g| g.predicates.is_empty())
            {
                return Err(SigmaError::Validation {
                    rule: self.title.clone(),
                    reason: format!("selection '{}' has no predicates", selection.name),
                });
            }
        }

        if self.detection.conditions.is_empty()
            || self.detection.conditions.iter().any(|c| c.trim().is_empty())
        {
            return Err(SigmaError::Validation {
                rule: self.title.clone(),
                reason: "detection must define a non-empty condition".to_owned(),
            });
        }

        Ok(())
    }
}

/// `Field|mod1|mod2` 키를 (필드, 연산자, 수정자)로 분해합니다.
///
/// 알 수 없는 수정자는 실패시키지 않고 `Modifiers::unsupported`에
/// 보관합니다 (컴파일 단계에서 거부).
pub(crate) fn parse_field_key(key: &str) -> (String, MatchOp, Modifiers) {
    let mut parts = key.split('|');
    let field = parts.next().unwrap_or_default().trim().to_owned();
    let mut op = MatchOp::Equals;
    let mut modifiers = Modifiers::default();

    for raw in parts {
        match raw.trim().to_lowercase().as_str() {
            // operators
            "contains" => op = MatchOp::Contains,
            "startswith" => op = MatchOp::StartsWith,
            "endswith" => op = MatchOp::EndsWith,
            "re" | "regex" => op = MatchOp::Regex,
            "exists" => op = MatchOp::Exists,
            "lt" => op = MatchOp::Lt,
            "lte" => op = MatchOp::Lte,
            "gt" => op = MatchOp::Gt,
            "gte" => op = MatchOp::Gte,

            // modifiers
            "all" => modifiers.all_values = true,
            "cased" => modifiers.cased = true,

            "" => {}
            other => modifiers.unsupported.push(other.to_owned()),
        }
    }

    (field, op, modifiers)
}
