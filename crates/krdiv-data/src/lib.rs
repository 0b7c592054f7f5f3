//! 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - KRX 전종목 ETF 종가 테이블 소스
//! - 네이버 증권 모바일 API 클라이언트 (시세/분배금/이력/디스커버리)
//! - FnGuide 상세 페이지 수집기 (라벨/테이블 휴리스틱 추출)
//! - 수동 분배금 이력 테이블
//! - 유니버스 스냅샷 저장소 (원자적 쓰기, 증분 병합)

pub mod error;
pub mod manual;
pub mod provider;
pub mod snapshot;

pub use error::{DataError, Result};
pub use manual::load_manual_history;
pub use snapshot::{SnapshotStore, UniverseSnapshot};

// 데이터 소스 재내보내기
pub use provider::fnguide::{
    extract_history_from_tables, extract_label_value, extract_name, FnGuideClient,
};
pub use provider::krx::KrxEtfSource;
pub use provider::naver::{BasicQuote, NaverMobileClient, PeriodReturns, PricePoint};
