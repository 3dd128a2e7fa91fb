//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sigmaforge_`
//! - 모듈명: `convert_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sigmaforge_core::metrics::CONVERT_DOCS_CONVERTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 실패 단계 레이블 키 (read, parse, convert)
pub const LABEL_STAGE: &str = "stage";

/// 출력 도메인 레이블 키 (windows, linux, other)
pub const LABEL_DOMAIN: &str = "domain";

/// 정규화 파이프라인 레이블 키 (ecs_windows, identity 등)
pub const LABEL_PIPELINE: &str = "pipeline";

// ─── Convert 메트릭 ────────────────────────────────────────────────

/// Convert: 발견된 규칙 파일 수 (counter)
pub const CONVERT_RULE_FILES_TOTAL: &str = "sigmaforge_convert_rule_files_total";

/// Convert: 출력 스트림에 기록된 문서 수 (counter, label: domain)
pub const CONVERT_DOCS_CONVERTED_TOTAL: &str = "sigmaforge_convert_docs_converted_total";

/// Convert: 건너뛴 항목 수 (counter, label: stage)
pub const CONVERT_ITEMS_SKIPPED_TOTAL: &str = "sigmaforge_convert_items_skipped_total";

/// Convert: 중복 규칙 ID로 버려진 문서 수 (counter)
pub const CONVERT_DUPLICATE_IDS_TOTAL: &str = "sigmaforge_convert_duplicate_ids_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`를 호출하여 HELP 텍스트를 설정합니다.
/// 전역 레코더 설치 후 한 번만 호출해야 하며, 레코더가 없으면
/// 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        CONVERT_RULE_FILES_TOTAL,
        "Total number of rule files discovered per run"
    );
    describe_counter!(
        CONVERT_DOCS_CONVERTED_TOTAL,
        "Documents written to an output stream, per domain"
    );
    describe_counter!(
        CONVERT_ITEMS_SKIPPED_TOTAL,
        "Items skipped due to a per-item failure, per stage"
    );
    describe_counter!(
        CONVERT_DUPLICATE_IDS_TOTAL,
        "Documents dropped because their rule id was already written"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_all_is_safe_without_recorder() {
        // 전역 레코더 미설치 상태에서도 패닉 없이 동작해야 한다
        describe_all();
    }

    #[test]
    fn metric_names_follow_convention() {
        for name in [
            CONVERT_RULE_FILES_TOTAL,
            CONVERT_DOCS_CONVERTED_TOTAL,
            CONVERT_ITEMS_SKIPPED_TOTAL,
            CONVERT_DUPLICATE_IDS_TOTAL,
        ] {
            assert!(name.starts_with("sigmaforge_convert_"));
            assert!(name.ends_with("_total"));
        }
    }
}
