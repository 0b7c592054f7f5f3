//! KRX 구간별 종가 테이블 조립.
//!
//! 현재가 + 6개 조회 구간(1/3/6개월, 1/3/5년) 각각에 대해 전종목 종가
//! 테이블을 받아 종목코드 → 구간별 종가로 재조립합니다. 구간별 조회는
//! 호출 수가 7건으로 고정되어 있어 구간당 하나씩 작은 병렬 팬아웃으로
//! 돌립니다 (네이버 쪽 동시 요청 상한과는 무관).

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use futures::future::join_all;
use tracing::{info, warn};

use krdiv_core::{Horizon, HorizonCloses};
use krdiv_data::KrxEtfSource;

/// 종목코드 → 구간별 종가 매핑.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    closes: HashMap<String, HorizonCloses>,
}

impl PriceTable {
    /// 현재가 테이블과 구간별 테이블로 조립.
    ///
    /// 현재가 테이블에 있는 종목만 대상으로 하며, 구간 테이블에 없는
    /// 종목의 해당 구간은 0(미상)으로 남습니다.
    pub fn from_tables(
        now_table: HashMap<String, i64>,
        horizon_tables: Vec<(Horizon, HashMap<String, i64>)>,
    ) -> Self {
        let mut closes: HashMap<String, HorizonCloses> = now_table
            .into_iter()
            .map(|(ticker, now)| {
                (
                    ticker,
                    HorizonCloses {
                        now,
                        ..Default::default()
                    },
                )
            })
            .collect();

        for (horizon, table) in horizon_tables {
            for (ticker, close) in table {
                if let Some(entry) = closes.get_mut(&ticker) {
                    entry.set(horizon, close);
                }
            }
        }

        Self { closes }
    }

    /// 스냅샷에서 역산한 구간별 종가 테이블로 생성 (폴백 경로).
    pub fn from_synthetic(tables: HashMap<String, HorizonCloses>) -> Self {
        Self { closes: tables }
    }

    /// 테이블이 비어 있는지 (KRX 전체 조회 실패 판단 기준).
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// 테이블에 있는 종목 수.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// 종목이 테이블에 있는지.
    pub fn contains(&self, ticker: &str) -> bool {
        self.closes.contains_key(ticker)
    }

    /// 종목의 구간별 종가. 없으면 전 구간 0.
    pub fn closes_for(&self, ticker: &str) -> HorizonCloses {
        self.closes.get(ticker).copied().unwrap_or_default()
    }

    /// 테이블의 전체 종목코드 (정렬됨).
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.closes.keys().cloned().collect();
        tickers.sort_unstable();
        tickers
    }
}

/// KRX에서 전 구간 종가 테이블을 병렬로 받아 조립.
///
/// 각 구간은 기준일부터 `step_back_days` 안에서 최근 거래일을 찾습니다.
/// 현재가 테이블이 비면 빈 `PriceTable`을 돌려주어 호출자가 스냅샷
/// 폴백으로 넘어가게 합니다.
pub async fn build(krx: &KrxEtfSource, today: NaiveDate, step_back_days: u32) -> PriceTable {
    // None = 현재가, Some(h) = 구간별 과거 종가
    let slots: Vec<Option<Horizon>> = std::iter::once(None)
        .chain(Horizon::ALL.into_iter().map(Some))
        .collect();

    let fetches = slots.into_iter().map(|slot| async move {
        let target = match slot {
            None => today,
            Some(horizon) => today
                .checked_sub_days(Days::new(horizon.lookback_days() as u64))
                .unwrap_or(today),
        };
        (slot, krx.latest_close_table(target, step_back_days).await)
    });

    let mut now_table = HashMap::new();
    let mut horizon_tables = Vec::with_capacity(Horizon::ALL.len());
    for (slot, table) in join_all(fetches).await {
        match slot {
            None => now_table = table,
            Some(horizon) => horizon_tables.push((horizon, table)),
        }
    }

    if now_table.is_empty() {
        warn!("KRX 현재가 테이블 없음");
        return PriceTable::default();
    }

    let table = PriceTable::from_tables(now_table, horizon_tables);
    info!(tickers = table.len(), "KRX 구간별 종가 테이블 조립 완료");
    table
}
