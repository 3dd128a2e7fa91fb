//! 변환 실행 오케스트레이션 -- 탐색/분류/컴파일/기록의 전체 흐름
//!
//! [`ConvertRunner`]는 규칙 파일 하나, 규칙 하나, 문서 하나를 엄격히
//! 순차 처리합니다. 파일/규칙/문서 단위 실패는 모두 지역적으로
//! 복구되어 리포트에 집계되며, 실행을 중단시키는 것은 규칙 루트
//! 부재(사전조건)와 출력 스트림 에러뿐입니다. 출력 스트림은 성공이든
//! 실패든 반드시 닫힙니다.
//!
//! # 처리 흐름
//! ```text
//! discover -> read -> parse -> (per rule) classify + select_pipeline
//!          -> LuceneBackend::convert -> OutputSet::accept -> RunStats
//! ```

use std::path::Path;

use sigmaforge_core::metrics as metric_names;
use sigmaforge_sigma::rule::RuleCollection;
use sigmaforge_sigma::{LuceneBackend, SigmaError};

use crate::classify::classify;
use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::loader;
use crate::report::{FailureRecord, RunReport, RunStats};
use crate::select::select_pipeline;
use crate::writer::{OutputSet, WriteOutcome};

/// 변환 실행기
///
/// 설정 하나로 생성되어 [`ConvertRunner::run`] 호출마다 독립적인
/// 실행을 수행합니다 (공유 전역 상태 없음).
pub struct ConvertRunner {
    config: ConvertConfig,
}

impl ConvertRunner {
    /// 설정을 검증하고 실행기를 생성합니다.
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 실행 설정을 반환합니다.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// 변환 실행 전체를 수행하고 최종 리포트를 반환합니다.
    ///
    /// # Errors
    /// - 규칙 루트 디렉토리 부재 ([`ConvertError::RulesRootMissing`]) —
    ///   어떤 파일도 읽기 전에 검사됩니다.
    /// - 출력 스트림 열기/기록 실패
    ///
    /// 규칙 파일/규칙/문서 단위 실패는 에러가 아니라 리포트의
    /// failure 목록으로 반환됩니다.
    pub async fn run(&self) -> Result<RunReport, ConvertError> {
        // 사전조건: 규칙 루트가 존재해야 한다 (유일한 치명적 입력 검사)
        let files = loader::discover_rule_files(&self.config.rules_dir, self.config.limit).await?;
        metrics::counter!(metric_names::CONVERT_RULE_FILES_TOTAL).increment(files.len() as u64);

        let mut outputs =
            OutputSet::open(&self.config.domain_outputs(), self.config.combined_output.as_deref())
                .await?;
        let mut stats = RunStats::new();

        // 스트림은 어떤 경로로 끝나든 닫는다
        let result = self.process_files(&files, &mut outputs, &mut stats).await;
        let close_result = outputs.close().await;
        result?;
        close_result?;

        let report = stats.into_report(files.len(), &self.config);
        tracing::info!(
            converted = report.converted,
            skipped = report.skipped,
            duplicates = report.duplicates,
            "conversion run finished"
        );
        Ok(report)
    }

    async fn process_files(
        &self,
        files: &[std::path::PathBuf],
        outputs: &mut OutputSet,
        stats: &mut RunStats,
    ) -> Result<(), ConvertError> {
        for path in files {
            let text = match loader::read_rule_file(path).await {
                Ok(text) => text,
                Err(e) => {
                    stats.record_failure(FailureRecord::read(path.display().to_string(), e));
                    continue;
                }
            };

            let collection = match RuleCollection::from_yaml(&text, &path.display().to_string()) {
                Ok(collection) => collection,
                Err(e) => {
                    stats.record_failure(FailureRecord::parse(path.display().to_string(), e));
                    continue;
                }
            };

            for rule in collection.rules() {
                self.process_rule(rule, path, outputs, stats).await?;
            }
        }

        Ok(())
    }

    async fn process_rule(
        &self,
        rule: &sigmaforge_sigma::SigmaRule,
        path: &Path,
        outputs: &mut OutputSet,
        stats: &mut RunStats,
    ) -> Result<(), ConvertError> {
        let pipeline = select_pipeline(&rule.logsource);
        let domain = classify(&rule.logsource);
        let pipeline_name = pipeline.name().to_owned();

        // 원본 스크립트처럼 규칙마다 파이프라인에 바인딩된 백엔드를 만든다
        let backend = LuceneBackend::new(pipeline);
        let single = RuleCollection::single(rule.clone());

        let documents = match backend.convert(&single, &self.config.index_patterns) {
            Ok(documents) => documents,
            Err(e) => {
                stats.record_failure(failure_for_sigma_error(path, &rule.title, e));
                return Ok(());
            }
        };

        for mut document in documents {
            match outputs.accept(&mut document, domain).await? {
                WriteOutcome::Written => stats.record_written(&pipeline_name, domain),
                WriteOutcome::Duplicate => stats.record_duplicate(),
                WriteOutcome::MissingId => stats.record_failure(FailureRecord::convert(
                    path.display().to_string(),
                    rule.title.clone(),
                    "missing rule id",
                )),
                WriteOutcome::NoHandle => stats.record_failure(FailureRecord::convert(
                    path.display().to_string(),
                    rule.title.clone(),
                    format!("no output handle for domain {domain}"),
                )),
            }
        }

        Ok(())
    }
}

/// 규칙 단위 Sigma 에러를 단계에 맞는 실패 레코드로 변환합니다.
///
/// 컴파일 호출 중에도 파싱 계열 에러([`SigmaError::is_parse_stage`])가
/// 나올 수 있어 단계를 에러 쪽에서 판정합니다.
fn failure_for_sigma_error(path: &Path, rule_title: &str, error: SigmaError) -> FailureRecord {
    if error.is_parse_stage() {
        FailureRecord::parse(path.display().to_string(), error)
    } else {
        FailureRecord::convert(path.display().to_string(), rule_title.to_owned(), error)
    }
}
