//! # KrDiv Core
//!
//! 국내 상장 ETF 배당 유니버스의 핵심 도메인 모델을 제공합니다.
//!
//! 이 크레이트는 수집기 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목 레코드 및 분배금 이력 구조체
//! - 수익률/CAGR/TTM 계산 로직
//! - 섹터 분류
//! - 로깅 인프라

pub mod domain;
pub mod logging;

pub use domain::*;
pub use logging::*;
