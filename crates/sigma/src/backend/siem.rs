//! SIEM 규칙 문서 조립
//!
//! 컴파일된 Lucene 쿼리와 규칙 메타데이터를 탐지 엔진 수집 형식의
//! 문서 하나로 조립합니다. 문서는 NDJSON 스트림에 한 줄로 직렬화되어
//! 대량 등록됩니다.

use serde::{Deserialize, Serialize};

use sigmaforge_core::types::Severity;

use crate::rule::SigmaRule;

/// 문서 이름 최대 길이 (탐지 엔진 제한)
pub const SIEM_RULE_NAME_MAX: usize = 256;

/// 규칙 평가 주기
const DEFAULT_INTERVAL: &str = "1m";
/// 평가 윈도우 시작
const DEFAULT_FROM: &str = "now-1m";
/// 평가 윈도우 끝
const DEFAULT_TO: &str = "now";
/// 실행당 최대 시그널 수
const DEFAULT_MAX_SIGNALS: u32 = 1000;

/// SIEM 수집용 규칙 문서
///
/// 필드 구성은 탐지 엔진의 쿼리 규칙 생성 페이로드를 따릅니다.
/// `enabled`는 기록 직전에 출력 계층이 강제로 `true`로 설정합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiemRule {
    /// 표시 이름 (`SIGMA - <제목>`, 최대 256자)
    pub name: String,
    /// 소문자 규칙 고유 ID
    pub rule_id: String,
    /// 규칙 설명
    pub description: String,
    /// 심각도 파생 위험 점수
    pub risk_score: u8,
    /// 심각도 (low/medium/high/critical)
    pub severity: Severity,
    /// 평가 주기
    pub interval: String,
    /// 평가 윈도우 시작
    #[serde(rename = "from")]
    pub from_time: String,
    /// 평가 윈도우 끝
    #[serde(rename = "to")]
    pub to_time: String,
    /// 활성화 플래그
    pub enabled: bool,
    /// 규칙 유형 (query)
    #[serde(rename = "type")]
    pub rule_type: String,
    /// 쿼리 언어 (lucene)
    pub language: String,
    /// 대상 인덱스 패턴
    pub index: Vec<String>,
    /// 컴파일된 쿼리
    pub query: String,
    /// 태그 (`namespace-name` 평탄화)
    pub tags: Vec<String>,
    /// 작성자 목록
    pub author: Vec<String>,
    /// 참고 자료
    pub references: Vec<String>,
    /// 오탐 노트
    pub false_positives: Vec<String>,
    /// 실행당 최대 시그널 수
    pub max_signals: u32,
    /// 문서 버전
    pub version: u32,
}

impl SiemRule {
    /// 규칙과 컴파일된 쿼리에서 문서를 조립합니다.
    pub fn from_rule(rule: &SigmaRule, query: String, index: Vec<String>) -> Self {
        let severity = rule.severity();
        Self {
            name: display_name(&rule.title),
            rule_id: rule.id.to_lowercase(),
            description: rule.description.clone(),
            risk_score: severity.risk_score(),
            severity,
            interval: DEFAULT_INTERVAL.to_owned(),
            from_time: DEFAULT_FROM.to_owned(),
            to_time: DEFAULT_TO.to_owned(),
            enabled: false,
            rule_type: "query".to_owned(),
            language: "lucene".to_owned(),
            index,
            query,
            tags: rule.tags.iter().map(|t| format_tag(t)).collect(),
            author: rule.author.clone(),
            references: rule.references.clone(),
            false_positives: rule.false_positives.clone(),
            max_signals: DEFAULT_MAX_SIGNALS,
            version: 1,
        }
    }
}

/// `SIGMA - <제목>` 표시 이름을 만듭니다 (문자 단위 256자 절단).
fn display_name(title: &str) -> String {
    let name = format!("SIGMA - {title}");
    if name.chars().count() > SIEM_RULE_NAME_MAX {
        name.chars().take(SIEM_RULE_NAME_MAX).collect()
    } else {
        name
    }
}

/// `attack.t1059.001` -> `attack-t1059.001` 태그 평탄화
///
/// 첫 `.`만 네임스페이스 구분자로 취급합니다.
fn format_tag(tag: &str) -> String {
    match tag.split_once('.') {
        Some((namespace, name)) => format!("{namespace}-{name}"),
        None => tag.to_owned(),
    }
}
