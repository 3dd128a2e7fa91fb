//! Sigma 규칙 모델 및 로더
//!
//! - [`types`]: 규칙/로그소스/탐지 블록 데이터 구조
//! - [`loader`]: YAML 텍스트를 [`RuleCollection`]으로 파싱

pub mod loader;
pub mod types;

pub use loader::RuleCollection;
pub use types::{
    Detection, FieldValue, Logsource, MatchOp, Modifiers, Predicate, PredicateGroup, Selection,
    SigmaRule,
};
