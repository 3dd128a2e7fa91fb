//! 변환 오케스트레이션 에러 타입
//!
//! [`ConvertError`]는 실행 전체를 중단시키는 에러만 표현합니다.
//! 파일/규칙 단위 실패는 에러가 아니라
//! [`FailureRecord`](crate::report::FailureRecord)로 집계됩니다.
//! `From<ConvertError> for SigmaforgeError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use sigmaforge_core::error::{RunError, SigmaforgeError};

/// 변환 실행 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// 규칙 루트 디렉토리가 존재하지 않음 (유일한 사전조건 에러)
    #[error("rules directory not found: {path}")]
    RulesRootMissing {
        /// 확인한 경로
        path: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 출력 스트림 열기 실패
    #[error("output open error: {path}: {reason}")]
    OutputOpen {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 출력 스트림 기록 실패
    #[error("output write error: {path}: {reason}")]
    OutputWrite {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 문서 직렬화 실패
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConvertError> for SigmaforgeError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::RulesRootMissing { path } => {
                SigmaforgeError::Run(RunError::RulesRootMissing { path })
            }
            other => SigmaforgeError::Run(RunError::Failed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_root_missing_display() {
        let err = ConvertError::RulesRootMissing {
            path: "/srv/rules".to_owned(),
        };
        assert!(err.to_string().contains("/srv/rules"));
    }

    #[test]
    fn precondition_preserved_in_conversion() {
        let err = ConvertError::RulesRootMissing {
            path: "rules".to_owned(),
        };
        let top: SigmaforgeError = err.into();
        assert!(matches!(
            top,
            SigmaforgeError::Run(RunError::RulesRootMissing { .. })
        ));
    }

    #[test]
    fn other_errors_collapse_to_run_failed() {
        let err = ConvertError::OutputOpen {
            path: "out.ndjson".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let top: SigmaforgeError = err.into();
        assert!(matches!(top, SigmaforgeError::Run(RunError::Failed(_))));
    }
}
