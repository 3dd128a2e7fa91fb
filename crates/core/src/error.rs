//! 에러 타입 — 도메인별 에러 정의

/// Sigmaforge 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SigmaforgeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 변환 실행 에러
    #[error("run error: {0}")]
    Run(#[from] RunError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 변환 실행 에러
///
/// 규칙 단위 실패는 실행 리포트의 failure 목록으로만 집계되며
/// 여기에 도달하지 않습니다. 이 에러는 실행 전체를 중단시키는
/// 경우에만 사용됩니다.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 규칙 루트 디렉토리가 존재하지 않음 (유일한 사전조건 에러)
    #[error("rules directory not found: {path}")]
    RulesRootMissing { path: String },

    /// 실행 초기화/진행 실패
    #[error("run failed: {0}")]
    Failed(String),
}
