//! 도메인 분류 -- 로그 소스 메타데이터를 출력 도메인에 매핑
//!
//! 분류는 파이프라인 선택([`select`](crate::select))과 독립적인
//! 축입니다. 분류는 출력 번들 그룹핑을, 선택은 쿼리 필드 정규화를
//! 결정하며 두 축을 섞지 않습니다.

use sigmaforge_core::types::Domain;
use sigmaforge_sigma::Logsource;

/// Linux 계열 판정 토큰
///
/// product는 정확히 일치, category/service는 부분 문자열 포함으로
/// 검사합니다.
const LINUX_TOKENS: [&str; 7] = [
    "linux", "unix", "ubuntu", "debian", "redhat", "centos", "rhel",
];

/// 로그 소스 메타데이터를 출력 도메인으로 분류합니다.
///
/// 먼저 일치하는 규칙이 이깁니다 (대소문자 무시, 누락 필드는 빈
/// 문자열 취급). 순수 함수이며 같은 입력에는 항상 같은 결과를
/// 반환합니다.
///
/// 1. product 또는 service가 "windows"이거나 category가 "windows"를
///    포함 -> [`Domain::Windows`]
/// 2. product가 Linux 토큰과 일치하거나 category/service가 토큰을
///    포함 -> [`Domain::Linux`]
/// 3. 그 외 -> [`Domain::Other`]
pub fn classify(logsource: &Logsource) -> Domain {
    let product = logsource.product_norm();
    let service = logsource.service_norm();
    let category = logsource.category_norm();

    if product == "windows" || service == "windows" || category.contains("windows") {
        return Domain::Windows;
    }

    if LINUX_TOKENS.contains(&product.as_str())
        || LINUX_TOKENS.iter().any(|token| category.contains(token))
        || LINUX_TOKENS.iter().any(|token| service.contains(token))
    {
        return Domain::Linux;
    }

    Domain::Other
}
