//! Sigma 컴파일러 에러 타입
//!
//! [`SigmaError`]는 규칙 파싱과 쿼리 컴파일에서 발생하는 모든 에러를
//! 표현합니다. `From<SigmaError> for SigmaforgeError` 변환이 구현되어
//! 있어 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use sigmaforge_core::error::{RunError, SigmaforgeError};

/// Sigma 컴파일러 도메인 에러
///
/// 파싱(`Parse`/`Validation`)과 컴파일(`Condition`/`Unsupported`)
/// 단계를 구분합니다. 변환 오케스트레이터는 이 구분을 실패 리포트의
/// stage 필드에 그대로 반영합니다.
#[derive(Debug, thiserror::Error)]
pub enum SigmaError {
    /// YAML 파싱 실패
    #[error("parse error: {source_name}: {reason}")]
    Parse {
        /// 규칙 출처 (파일 경로 등)
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 규칙 구조 검증 실패
    #[error("rule validation error: rule '{rule}': {reason}")]
    Validation {
        /// 문제가 된 규칙 제목 또는 ID
        rule: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// detection condition 식 해석 실패
    #[error("condition error: rule '{rule}': {reason}")]
    Condition {
        /// 문제가 된 규칙 제목
        rule: String,
        /// 실패 사유
        reason: String,
    },

    /// 지원하지 않는 규칙 구성 (컴파일 단계에서 거부)
    #[error("unsupported construct: rule '{rule}': {construct}")]
    Unsupported {
        /// 문제가 된 규칙 제목
        rule: String,
        /// 지원하지 않는 구성 설명
        construct: String,
    },

    /// 정규식 컴파일 에러 (|re 수정자 검증)
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SigmaError {
    /// 파싱 단계 에러인지 여부를 반환합니다.
    ///
    /// 파싱 단계 에러는 실행 리포트에 `parse` 단계로, 나머지는
    /// `convert` 단계로 집계됩니다.
    pub fn is_parse_stage(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Validation { .. })
    }
}

impl From<SigmaError> for SigmaforgeError {
    fn from(err: SigmaError) -> Self {
        SigmaforgeError::Run(RunError::Failed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = SigmaError::Parse {
            source_name: "rules/bad.yml".to_owned(),
            reason: "mapping expected".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rules/bad.yml"));
        assert!(msg.contains("mapping expected"));
    }

    #[test]
    fn unsupported_error_display() {
        let err = SigmaError::Unsupported {
            rule: "Suspicious Thing".to_owned(),
            construct: "modifier 'base64'".to_owned(),
        };
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn stage_split() {
        let parse = SigmaError::Parse {
            source_name: "x".to_owned(),
            reason: "y".to_owned(),
        };
        let compile = SigmaError::Condition {
            rule: "x".to_owned(),
            reason: "y".to_owned(),
        };
        assert!(parse.is_parse_stage());
        assert!(!compile.is_parse_stage());
    }

    #[test]
    fn converts_to_sigmaforge_error() {
        let err = SigmaError::Validation {
            rule: "r".to_owned(),
            reason: "empty title".to_owned(),
        };
        let top: SigmaforgeError = err.into();
        assert!(matches!(top, SigmaforgeError::Run(_)));
    }
}
