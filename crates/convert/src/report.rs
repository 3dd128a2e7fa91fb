//! 실행 통계 및 리포트 -- 변환 실행의 최종 결과물
//!
//! [`RunStats`]는 실행 중 오케스트레이터만이 갱신하는 누적 상태이고,
//! [`RunReport`]는 실행 종료 시 한 번 조립되는 불변 결과입니다.
//! 리포트는 JSON으로 표준 출력에 인쇄되며, 실패 레코드에는 재실행
//! 없이 문제 규칙 파일을 찾을 수 있는 컨텍스트(경로/제목/단계/사유)가
//! 담깁니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use sigmaforge_core::types::Domain;
use sigmaforge_core::metrics as metric_names;

use crate::config::ConvertConfig;

/// 실패가 발생한 처리 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// 파일 읽기 실패
    Read,
    /// 규칙 파싱 실패
    Parse,
    /// 쿼리 컴파일/문서 기록 실패
    Convert,
}

impl FailureStage {
    /// 소문자 문자열 표현을 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Parse => "parse",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 실패 레코드 하나
///
/// append-only 목록으로 수집되어 리포트에 그대로 실립니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 규칙 파일 경로
    pub path: String,
    /// 규칙 제목 (규칙 단위 실패에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// 실패 단계
    pub stage: FailureStage,
    /// 실패 사유
    pub error: String,
}

impl FailureRecord {
    /// 읽기 단계 실패 레코드를 만듭니다.
    pub fn read(path: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            rule: None,
            stage: FailureStage::Read,
            error: error.to_string(),
        }
    }

    /// 파싱 단계 실패 레코드를 만듭니다.
    pub fn parse(path: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            rule: None,
            stage: FailureStage::Parse,
            error: error.to_string(),
        }
    }

    /// 변환 단계 실패 레코드를 만듭니다 (규칙 제목 포함).
    pub fn convert(
        path: impl Into<String>,
        rule: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            path: path.into(),
            rule: Some(rule.into()),
            stage: FailureStage::Convert,
            error: error.to_string(),
        }
    }
}

/// 실행 중 누적되는 통계
///
/// 오케스트레이터 외의 컴포넌트는 이 카운터를 갱신하지 않습니다.
#[derive(Debug, Default)]
pub struct RunStats {
    converted: u64,
    skipped: u64,
    duplicates: u64,
    pipeline_stats: BTreeMap<String, u64>,
    domain_stats: BTreeMap<String, u64>,
    failures: Vec<FailureRecord>,
}

impl RunStats {
    /// 빈 통계를 만듭니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 문서 기록 성공을 집계합니다.
    pub fn record_written(&mut self, pipeline: &str, domain: Domain) {
        self.converted += 1;
        *self
            .pipeline_stats
            .entry(pipeline.to_owned())
            .or_insert(0) += 1;
        *self
            .domain_stats
            .entry(domain.as_str().to_owned())
            .or_insert(0) += 1;

        metrics::counter!(
            metric_names::CONVERT_DOCS_CONVERTED_TOTAL,
            metric_names::LABEL_DOMAIN => domain.as_str()
        )
        .increment(1);
    }

    /// 중복 규칙 ID를 집계합니다 (skip으로 치지 않음).
    pub fn record_duplicate(&mut self) {
        self.duplicates += 1;
        metrics::counter!(metric_names::CONVERT_DUPLICATE_IDS_TOTAL).increment(1);
    }

    /// 실패를 집계합니다 (skip 카운터 증가 + 레코드 추가).
    pub fn record_failure(&mut self, record: FailureRecord) {
        tracing::warn!(
            path = %record.path,
            stage = %record.stage,
            error = %record.error,
            "conversion item failed, skipping"
        );

        metrics::counter!(
            metric_names::CONVERT_ITEMS_SKIPPED_TOTAL,
            metric_names::LABEL_STAGE => record.stage.as_str()
        )
        .increment(1);

        self.skipped += 1;
        self.failures.push(record);
    }

    /// 기록된 문서 수를 반환합니다.
    pub fn converted(&self) -> u64 {
        self.converted
    }

    /// 건너뛴 항목 수를 반환합니다.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// 중복 규칙 ID 수를 반환합니다.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// 실패 레코드 목록을 반환합니다.
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// 실행 종료 시 불변 리포트로 변환합니다.
    pub fn into_report(self, total_files: usize, config: &ConvertConfig) -> RunReport {
        let group_outputs = config
            .domain_outputs()
            .into_iter()
            .map(|(domain, path)| {
                (domain.as_str().to_owned(), path.display().to_string())
            })
            .collect();

        RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            converted: self.converted,
            skipped: self.skipped,
            duplicates: self.duplicates,
            total_files,
            pipeline_stats: self.pipeline_stats,
            domain_stats: self.domain_stats,
            failures: self.failures,
            group_outputs,
            output: config
                .combined_output
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

/// 실행 최종 리포트
///
/// 조립 이후 변경되지 않으며, JSON 하나로 직렬화되어 표준 출력에
/// 인쇄됩니다. 맵 필드는 `BTreeMap`이라 키 순서가 결정적입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// 실행 식별자
    pub run_id: String,
    /// 기록된 문서 수
    pub converted: u64,
    /// 건너뛴 항목 수
    pub skipped: u64,
    /// 중복 규칙 ID 수
    pub duplicates: u64,
    /// 발견된 규칙 파일 수
    pub total_files: usize,
    /// 파이프라인 이름별 문서 수
    pub pipeline_stats: BTreeMap<String, u64>,
    /// 도메인별 문서 수
    pub domain_stats: BTreeMap<String, u64>,
    /// 실패 레코드 전체
    pub failures: Vec<FailureRecord>,
    /// 도메인별 출력 경로
    pub group_outputs: BTreeMap<String, String>,
    /// 통합 출력 경로 (설정된 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}
