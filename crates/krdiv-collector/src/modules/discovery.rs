//! 유니버스 디스커버리와 ETF 필터.
//!
//! 한 번의 갱신에서 처리할 최종 종목 집합을 결정합니다. 네이버 ETF
//! 목록은 매 실행 조회하며, 목록에 없는 종목(일반 주식 등)은 유니버스를
//! 오염시키지 않도록 걸러냅니다.

use std::collections::BTreeSet;

use tracing::{info, warn};

use krdiv_data::NaverMobileClient;

use super::price_table::PriceTable;

/// 디스커버리/필터 결과.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTargets {
    /// 정합 대상 종목 (정렬됨)
    pub tickers: Vec<String>,
    /// ETF 목록에 없어 건너뛴 종목 수
    pub skipped: usize,
}

/// 이번 실행의 대상 종목 집합을 결정합니다.
///
/// 전체 갱신 모드 전환 조건: 요청 종목이 없거나(전체 의미), 기준 수를
/// 넘거나, 요청 종목 중 KRX 테이블에 없는 것이 있을 때 (로컬 유니버스가
/// 낡았다는 신호). 전체 모드에서는 디렉터리 전체를 요청 집합에 합칩니다.
pub async fn resolve_targets(
    naver: &NaverMobileClient,
    requested: Option<&[String]>,
    price_table: &PriceTable,
    full_universe_threshold: usize,
) -> ResolvedTargets {
    let directory = naver.etf_directory().await;

    let requested_none = requested.is_none_or(|list| list.is_empty());
    let initial: BTreeSet<String> = match requested {
        Some(list) if !list.is_empty() => list.iter().cloned().collect(),
        _ => price_table.tickers().into_iter().collect(),
    };

    let has_unknown = initial.iter().any(|t| !price_table.contains(t));
    let full_universe =
        requested_none || initial.len() > full_universe_threshold || has_unknown;

    let mut candidates = initial;
    if full_universe && !directory.is_empty() {
        let before = candidates.len();
        candidates.extend(directory.keys().cloned());
        let discovered = candidates.len() - before;
        if discovered > 0 {
            info!(discovered, "네이버 목록에서 신규 ETF 발견");
        }
    }

    let mut skipped = 0;
    let tickers: Vec<String> = candidates
        .into_iter()
        .filter(|ticker| {
            if directory.contains_key(ticker) {
                true
            } else {
                info!(ticker, "ETF 목록에 없는 종목, 건너뜀");
                skipped += 1;
                false
            }
        })
        .collect();

    if tickers.is_empty() {
        warn!("처리할 유효한 ETF 없음");
    }

    ResolvedTargets { tickers, skipped }
}
