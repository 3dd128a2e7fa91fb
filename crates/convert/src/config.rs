//! 변환 실행 설정
//!
//! [`ConvertConfig`]는 core의
//! [`ConvertSettings`](sigmaforge_core::config::ConvertSettings)를
//! 기반으로 변환 실행 전용 런타임 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use sigmaforge_core::config::SigmaforgeConfig;
//! use sigmaforge_convert::config::ConvertConfig;
//!
//! let core_config = SigmaforgeConfig::default();
//! let config = ConvertConfig::from_core(&core_config.convert);
//! ```

use std::path::{Path, PathBuf};

use sigmaforge_core::types::Domain;

use crate::error::ConvertError;

/// 변환 실행 설정
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 규칙 루트 디렉토리
    pub rules_dir: PathBuf,
    /// 통합 출력 경로 (선택)
    pub combined_output: Option<PathBuf>,
    /// Windows 도메인 출력 경로
    pub windows_output: PathBuf,
    /// Linux 도메인 출력 경로
    pub linux_output: PathBuf,
    /// 나머지 도메인 출력 경로
    pub other_output: PathBuf,
    /// 처리할 규칙 파일 수 제한 (0 = 무제한, 디버깅용)
    pub limit: usize,
    /// SIEM 문서에 기록할 인덱스 패턴
    pub index_patterns: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from_core(&sigmaforge_core::config::ConvertSettings::default())
    }
}

impl ConvertConfig {
    /// core의 `ConvertSettings`에서 런타임 설정을 생성합니다.
    pub fn from_core(core: &sigmaforge_core::config::ConvertSettings) -> Self {
        Self {
            rules_dir: PathBuf::from(&core.rules_dir),
            combined_output: core.combined_output.as_ref().map(PathBuf::from),
            windows_output: PathBuf::from(&core.windows_output),
            linux_output: PathBuf::from(&core.linux_output),
            other_output: PathBuf::from(&core.other_output),
            limit: core.limit,
            index_patterns: core.index_patterns.clone(),
        }
    }

    /// 도메인별 출력 경로를 [`Domain::ALL`] 순서로 반환합니다.
    pub fn domain_outputs(&self) -> Vec<(Domain, &Path)> {
        vec![
            (Domain::Windows, self.windows_output.as_path()),
            (Domain::Linux, self.linux_output.as_path()),
            (Domain::Other, self.other_output.as_path()),
        ]
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.rules_dir.as_os_str().is_empty() {
            return Err(ConvertError::Config {
                field: "rules_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        let outputs = [
            ("windows_output", &self.windows_output),
            ("linux_output", &self.linux_output),
            ("other_output", &self.other_output),
        ];
        for (field, path) in outputs {
            if path.as_os_str().is_empty() {
                return Err(ConvertError::Config {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                });
            }
        }

        if let Some(combined) = &self.combined_output
            && combined.as_os_str().is_empty()
        {
            return Err(ConvertError::Config {
                field: "combined_output".to_owned(),
                reason: "must not be empty when set".to_owned(),
            });
        }

        if self.index_patterns.is_empty()
            || self.index_patterns.iter().any(|p| p.trim().is_empty())
        {
            return Err(ConvertError::Config {
                field: "index_patterns".to_owned(),
                reason: "at least one non-empty index pattern is required".to_owned(),
            });
        }

        Ok(())
    }
}

/// 변환 설정 빌더
#[derive(Debug, Default)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ConvertConfig::default(),
        }
    }

    /// 규칙 루트 디렉토리를 설정합니다.
    pub fn rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.rules_dir = dir.into();
        self
    }

    /// 통합 출력 경로를 설정합니다.
    pub fn combined_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.combined_output = Some(path.into());
        self
    }

    /// Windows 도메인 출력 경로를 설정합니다.
    pub fn windows_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.windows_output = path.into();
        self
    }

    /// Linux 도메인 출력 경로를 설정합니다.
    pub fn linux_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.linux_output = path.into();
        self
    }

    /// 나머지 도메인 출력 경로를 설정합니다.
    pub fn other_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.other_output = path.into();
        self
    }

    /// 규칙 파일 수 제한을 설정합니다 (0 = 무제한).
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    /// 인덱스 패턴을 설정합니다.
    pub fn index_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.index_patterns = patterns;
        self
    }

    /// 설정을 검증하고 `ConvertConfig`를 생성합니다.
    pub fn build(self) -> Result<ConvertConfig, ConvertError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
