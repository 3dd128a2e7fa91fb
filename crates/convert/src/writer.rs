//! 중복 제거 및 출력 분배 -- 문서를 도메인별/통합 스트림에 기록합니다.
//!
//! [`OutputSet`]은 실행 시작 시 한 번 열리고, 정상 종료든 중간 실패든
//! 모든 경로에서 [`OutputSet::close`]로 플러시/닫기가 보장되어야
//! 합니다. 규칙 ID 집합은 실행 수명 동안 단조 증가하며, 같은 ID는
//! 어느 스트림에도 두 번 기록되지 않습니다.
//!
//! 기록은 처리 순서 그대로 스트림별 append이며, 한 줄 단위 직렬화
//! 외의 재정렬이나 추가 버퍼링을 하지 않습니다 (다운스트림 수집이
//! 줄 단위·순서 민감).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use sigmaforge_core::types::Domain;
use sigmaforge_sigma::SiemRule;

use crate::error::ConvertError;

/// 문서 하나에 대한 기록 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 도메인 스트림(및 통합 스트림)에 기록됨
    Written,
    /// 이미 기록된 규칙 ID — 기록하지 않음
    Duplicate,
    /// 규칙 ID 누락 — 기록하지 않음 (convert 단계 실패로 집계)
    MissingId,
    /// 도메인 스트림도 other fallback도 없음 — 기록하지 않음
    NoHandle,
}

struct StreamHandle {
    path: String,
    writer: BufWriter<File>,
}

impl StreamHandle {
    async fn open(path: &Path) -> Result<Self, ConvertError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConvertError::OutputOpen {
                    path: path.display().to_string(),
                    reason: format!("failed to create parent directory: {e}"),
                })?;
        }

        let file = File::create(path)
            .await
            .map_err(|e| ConvertError::OutputOpen {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path: path.display().to_string(),
            writer: BufWriter::new(file),
        })
    }

    async fn write_line(&mut self, line: &str) -> Result<(), ConvertError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| write_error(&self.path, e))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| write_error(&self.path, e))
    }

    async fn close(mut self) -> Result<(), ConvertError> {
        self.writer
            .flush()
            .await
            .map_err(|e| ConvertError::OutputWrite {
                path: self.path,
                reason: format!("failed to flush: {e}"),
            })
    }
}

fn write_error(path: &str, e: std::io::Error) -> ConvertError {
    ConvertError::OutputWrite {
        path: path.to_owned(),
        reason: e.to_string(),
    }
}

/// 도메인별 출력 스트림 집합과 규칙 ID 중복 추적기
///
/// 오케스트레이터가 소유하는 상태 객체입니다. 전역 변수가 없으므로
/// 한 프로세스에서 여러 실행을 독립적으로 반복할 수 있습니다.
pub struct OutputSet {
    handles: HashMap<Domain, StreamHandle>,
    combined: Option<StreamHandle>,
    seen_ids: HashSet<String>,
}

impl OutputSet {
    /// 출력 스트림을 엽니다 (부모 디렉토리 자동 생성).
    ///
    /// 실행당 한 번, 규칙 처리를 시작하기 전에 호출됩니다.
    pub async fn open(
        domain_outputs: &[(Domain, &Path)],
        combined_output: Option<&Path>,
    ) -> Result<Self, ConvertError> {
        let mut handles = HashMap::with_capacity(domain_outputs.len());
        for (domain, path) in domain_outputs {
            handles.insert(*domain, StreamHandle::open(path).await?);
        }

        let combined = match combined_output {
            Some(path) => Some(StreamHandle::open(path).await?),
            None => None,
        };

        Ok(Self {
            handles,
            combined,
            seen_ids: HashSet::new(),
        })
    }

    /// 문서 하나를 받아 중복 검사 후 해당 도메인 스트림에 기록합니다.
    ///
    /// 기록되는 문서는 `enabled`가 강제로 `true`로 설정됩니다.
    /// 반환되는 [`WriteOutcome`]의 카운터 집계는 호출자 몫입니다.
    ///
    /// # Errors
    /// 직렬화 실패나 스트림 기록 실패는 실행 전체를 중단시킵니다
    /// (부분 줄이 남지 않도록 한 줄 전체를 직렬화한 뒤 기록).
    pub async fn accept(
        &mut self,
        doc: &mut SiemRule,
        domain: Domain,
    ) -> Result<WriteOutcome, ConvertError> {
        let rule_id = doc.rule_id.trim().to_lowercase();
        if rule_id.is_empty() {
            return Ok(WriteOutcome::MissingId);
        }

        if self.seen_ids.contains(&rule_id) {
            return Ok(WriteOutcome::Duplicate);
        }

        // ID는 핸들 유무와 무관하게 이 시점에 소비된다
        self.seen_ids.insert(rule_id);
        doc.enabled = true;

        let target = if self.handles.contains_key(&domain) {
            domain
        } else if self.handles.contains_key(&Domain::Other) {
            Domain::Other
        } else {
            return Ok(WriteOutcome::NoHandle);
        };

        let line = serde_json::to_string(doc)?;
        if let Some(handle) = self.handles.get_mut(&target) {
            handle.write_line(&line).await?;
        }

        if let Some(combined) = &mut self.combined {
            combined.write_line(&line).await?;
        }

        Ok(WriteOutcome::Written)
    }

    /// 지금까지 기록된 고유 규칙 ID 수를 반환합니다.
    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// 모든 스트림을 플러시하고 닫습니다.
    ///
    /// 실행의 모든 종료 경로에서 호출되어야 합니다.
    pub async fn close(self) -> Result<(), ConvertError> {
        for (_, handle) in self.handles {
            handle.close().await?;
        }
        if let Some(combined) = self.combined {
            combined.close().await?;
        }
        Ok(())
    }
}
