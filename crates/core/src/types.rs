//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 변환 대상 규칙의 심각도와 출력 번들 도메인을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 심각도 레벨
///
/// SIEM 규칙 문서가 허용하는 심각도 집합입니다.
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Low < Medium < High < Critical`).
/// 인식할 수 없는 레벨 문자열은 `Low`로 강등됩니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 낮은 심각도 (기본값 — sigma의 informational 포함)
    #[default]
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "info" | "informational" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// SIEM 문서의 risk_score 값으로 변환합니다.
    ///
    /// Elastic 탐지 규칙의 관례적 매핑 (21/47/73/99)을 따릅니다.
    pub fn risk_score(self) -> u8 {
        match self {
            Self::Low => 21,
            Self::Medium => 47,
            Self::High => 73,
            Self::Critical => 99,
        }
    }

    /// 소문자 문자열 표현을 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 출력 번들 도메인
///
/// 규칙 하나는 정확히 하나의 도메인으로 분류되어
/// 해당 도메인의 NDJSON 출력 스트림에 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Windows 계열 로그 소스
    Windows,
    /// Linux/Unix 계열 로그 소스
    Linux,
    /// 그 외 전부 (fallback 스트림)
    Other,
}

impl Domain {
    /// 전체 도메인 목록 (출력 스트림 구성 순서)
    pub const ALL: [Domain; 3] = [Domain::Windows, Domain::Linux, Domain::Other];

    /// 소문자 문자열 표현을 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
