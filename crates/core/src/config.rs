//! 설정 관리 — sigmaforge.toml 파싱 및 런타임 설정
//!
//! [`SigmaforgeConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SIGMAFORGE_CONVERT_RULES_DIR=rules` 형식)
//! 3. 설정 파일 (`sigmaforge.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sigmaforge_core::error::SigmaforgeError> {
//! use sigmaforge_core::config::SigmaforgeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SigmaforgeConfig::load("sigmaforge.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SigmaforgeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SigmaforgeError};

/// Sigmaforge 통합 설정
///
/// `sigmaforge.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigmaforgeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 변환 실행 설정
    #[serde(default)]
    pub convert: ConvertSettings,
}

impl SigmaforgeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SigmaforgeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SigmaforgeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SigmaforgeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SigmaforgeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SigmaforgeError> {
        toml::from_str(toml_str).map_err(|e| {
            SigmaforgeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SIGMAFORGE_{SECTION}_{FIELD}`
    /// 예: `SIGMAFORGE_CONVERT_RULES_DIR=./rules`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SIGMAFORGE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SIGMAFORGE_GENERAL_LOG_FORMAT");

        // Convert
        override_string(&mut self.convert.rules_dir, "SIGMAFORGE_CONVERT_RULES_DIR");
        override_opt_string(
            &mut self.convert.combined_output,
            "SIGMAFORGE_CONVERT_COMBINED_OUTPUT",
        );
        override_string(
            &mut self.convert.windows_output,
            "SIGMAFORGE_CONVERT_WINDOWS_OUTPUT",
        );
        override_string(
            &mut self.convert.linux_output,
            "SIGMAFORGE_CONVERT_LINUX_OUTPUT",
        );
        override_string(
            &mut self.convert.other_output,
            "SIGMAFORGE_CONVERT_OTHER_OUTPUT",
        );
        override_usize(&mut self.convert.limit, "SIGMAFORGE_CONVERT_LIMIT");
        override_csv(
            &mut self.convert.index_patterns,
            "SIGMAFORGE_CONVERT_INDEX_PATTERNS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SigmaforgeError> {
        const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(SigmaforgeError::Config(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of {LOG_LEVELS:?}"),
            }));
        }

        const LOG_FORMATS: &[&str] = &["text", "json"];
        if !LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(SigmaforgeError::Config(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of {LOG_FORMATS:?}"),
            }));
        }

        self.convert.validate()?;
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 로그 출력 형식 (text, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "json".to_owned()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// 변환 실행 설정 섹션
///
/// 경로는 문자열로 유지됩니다. 런타임 설정
/// (`sigmaforge_convert::ConvertConfig`)이 `PathBuf`로 변환합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSettings {
    /// 규칙 루트 디렉토리
    pub rules_dir: String,
    /// 통합 출력 NDJSON 경로 (선택)
    #[serde(default)]
    pub combined_output: Option<String>,
    /// Windows 도메인 출력 경로
    pub windows_output: String,
    /// Linux 도메인 출력 경로
    pub linux_output: String,
    /// 나머지 도메인 출력 경로
    pub other_output: String,
    /// 처리할 규칙 파일 수 제한 (0 = 무제한, 디버깅용)
    #[serde(default)]
    pub limit: usize,
    /// SIEM 문서에 기록할 인덱스 패턴 목록
    pub index_patterns: Vec<String>,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            rules_dir: "rules".to_owned(),
            combined_output: None,
            windows_output: "build/sigma-windows.ndjson".to_owned(),
            linux_output: "build/sigma-linux.ndjson".to_owned(),
            other_output: "build/sigma-generic.ndjson".to_owned(),
            limit: 0,
            index_patterns: vec!["logs-*".to_owned()],
        }
    }
}

impl ConvertSettings {
    /// 변환 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SigmaforgeError> {
        let paths = [
            ("convert.rules_dir", &self.rules_dir),
            ("convert.windows_output", &self.windows_output),
            ("convert.linux_output", &self.linux_output),
            ("convert.other_output", &self.other_output),
        ];
        for (field, value) in paths {
            if value.trim().is_empty() {
                return Err(SigmaforgeError::Config(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "path must not be empty".to_owned(),
                }));
            }
        }

        if self.index_patterns.is_empty()
            || self.index_patterns.iter().any(|p| p.trim().is_empty())
        {
            return Err(SigmaforgeError::Config(ConfigError::InvalidValue {
                field: "convert.index_patterns".to_owned(),
                reason: "at least one non-empty index pattern is required".to_owned(),
            }));
        }

        Ok(())
    }
}

// ─── 환경변수 오버라이드 헬퍼 ────────────────────────────────────────

fn override_string(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *target = value;
    }
}

fn override_opt_string(target: &mut Option<String>, var: &str) {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *target = Some(value);
    }
}

fn override_usize(target: &mut usize, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => {
                tracing::warn!(var, value, "ignoring non-numeric env override");
            }
        }
    }
}

fn override_csv(target: &mut Vec<String>, var: &str) {
    if let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *target = value
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
