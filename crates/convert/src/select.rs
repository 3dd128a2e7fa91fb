//! 파이프라인 선택 -- 로그 소스 메타데이터에 맞는 정규화 파이프라인 결정
//!
//! 선택은 도메인 분류([`classify`](crate::classify))와 독립적으로
//! 동작합니다. 어느 조건에도 맞지 않으면 변환 없는 identity
//! 파이프라인이 반환됩니다.

use sigmaforge_sigma::pipeline::{
    ecs_kubernetes, ecs_windows, ecs_zeek_beats, ecs_zeek_corelight, zeek_raw,
};
use sigmaforge_sigma::{FieldPipeline, Logsource};

/// 로그 소스 메타데이터에 맞는 필드 정규화 파이프라인을 선택합니다.
///
/// 우선순위 순서로 평가하며, 순수 함수입니다.
///
/// 1. windows product/category -> `ecs_windows`
///    (service가 security/sysmon이어도 항상 현행 파이프라인.
///    레거시 `ecs_windows_old`는 명명 파이프라인으로 존재하지만
///    여기서 선택되지 않습니다 — 구형 수집기 지원 여부는 제품
///    결정 대기 사항입니다.)
/// 2. zeek product/category -> service에 따라 corelight/raw/beats
/// 3. kubernetes product 또는 "k8s" category -> `ecs_kubernetes`
/// 4. 그 외 -> identity
pub fn select_pipeline(logsource: &Logsource) -> FieldPipeline {
    let product = logsource.product_norm();
    let service = logsource.service_norm();
    let category = logsource.category_norm();

    if product == "windows" || category.contains("windows") {
        return ecs_windows();
    }

    if product == "zeek" || category.contains("zeek") {
        if service.contains("corelight") {
            return ecs_zeek_corelight();
        }
        if service.contains("raw") {
            return zeek_raw();
        }
        return ecs_zeek_beats();
    }

    if product == "kubernetes" || category.contains("k8s") {
        return ecs_kubernetes();
    }

    FieldPipeline::identity()
}
