//! 규칙 파일 로더 -- 규칙 루트를 재귀 탐색하고 파일을 읽습니다.
//!
//! `.yml`/`.yaml` 확장자만 수집하며, 결과는 경로 기준 오름차순으로
//! 정렬되어 실행 간 결정적인 처리 순서를 보장합니다. 개별 파일의
//! 읽기/파싱 실패 처리는 호출자([`runner`](crate::runner))의 몫입니다.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// 규칙 루트를 재귀 탐색해 규칙 파일 경로를 수집합니다.
///
/// 반환 목록은 경로 기준으로 정렬됩니다. `limit`이 0보다 크면 정렬
/// 후 앞에서부터 그 개수만 남깁니다 (디버깅용).
///
/// # Errors
/// - 루트 디렉토리를 읽을 수 없는 경우 ([`ConvertError::RulesRootMissing`])
///
/// 하위 디렉토리 읽기 실패는 경고 로그를 남기고 건너뜁니다.
pub async fn discover_rule_files(
    root: impl AsRef<Path>,
    limit: usize,
) -> Result<Vec<PathBuf>, ConvertError> {
    let root = root.as_ref();

    if tokio::fs::metadata(root).await.is_err() {
        return Err(ConvertError::RulesRootMissing {
            path: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if dir == root {
                    return Err(ConvertError::RulesRootMissing {
                        path: root.display().to_string(),
                    });
                }
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "failed to read rules subdirectory, skipping"
                );
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        error = %e,
                        "failed to read directory entry, skipping rest of directory"
                    );
                    break;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to stat entry, skipping"
                    );
                    continue;
                }
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if is_rule_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();

    if limit > 0 && files.len() > limit {
        files.truncate(limit);
    }

    tracing::info!(
        root = %root.display(),
        count = files.len(),
        "discovered rule files"
    );

    Ok(files)
}

/// 규칙 파일 하나를 읽습니다.
///
/// 읽기 실패는 호출자가 read 단계 실패로 집계합니다.
pub async fn read_rule_file(path: impl AsRef<Path>) -> Result<String, std::io::Error> {
    tokio::fs::read_to_string(path.as_ref()).await
}

fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yml" || ext == "yaml")
}
