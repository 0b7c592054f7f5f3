//! 유니버스 갱신 오케스트레이터.
//!
//! 한 번의 갱신은 KRX 구간별 테이블 조립 → 디스커버리/필터 → 종목별
//! 정합 팬아웃 → 스냅샷 병합 저장 순으로 진행됩니다. 네이버로 나가는
//! 동시 요청은 `buffer_unordered`로 상한을 두고, 종목 간 완료 순서는
//! 보장하지 않습니다.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Local;
use futures::{stream, StreamExt};
use tracing::{info, warn};

use krdiv_core::QuoteSnapshot;
use krdiv_data::{
    load_manual_history, FnGuideClient, KrxEtfSource, NaverMobileClient, SnapshotStore,
};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::progress::{CancelToken, ProgressReporter};
use crate::stats::RefreshStats;

use super::discovery;
use super::price_table::{self, PriceTable};
use super::reconcile::Reconciler;

/// 갱신 실행 종료 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 정상 완료 (스냅샷 병합됨)
    Completed,
    /// 협조적 취소 (스냅샷 미변경)
    Cancelled,
    /// 실행 수준 실패 (KRX 전체 실패 + 캐시 스냅샷 없음)
    Failed,
}

/// 갱신 실행 요약. 실행 상태 중 유일하게 호출자에게 남는 값.
#[derive(Debug, Clone)]
pub struct RefreshSummary {
    /// 종료 상태
    pub status: RunStatus,
    /// 레코드가 갱신된 종목 수
    pub updated: usize,
    /// 완료까지 처리한 종목 수
    pub processed: usize,
    /// 처리 대상이었던 종목 수
    pub total: usize,
    /// 사람이 읽는 상태 메시지
    pub message: String,
}

impl RefreshSummary {
    fn completed(updated: usize, processed: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Completed,
            updated,
            processed,
            total,
            message: message.into(),
        }
    }

    fn cancelled(processed: usize, total: usize) -> Self {
        Self {
            status: RunStatus::Cancelled,
            updated: 0,
            processed,
            total,
            message: format!("취소됨 ({}/{})", processed, total),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            updated: 0,
            processed: 0,
            total: 0,
            message: message.into(),
        }
    }
}

/// 유니버스 갱신기.
///
/// 실행 상태(진행 카운터, 취소 플래그)는 전역이 아니라 호출 단위로
/// 전달받으며, 스냅샷 파일의 유일한 쓰기 경로는 이 타입이 들고 있는
/// `SnapshotStore`입니다.
pub struct UniverseRefresher {
    config: CollectorConfig,
    krx: KrxEtfSource,
    naver: NaverMobileClient,
    fnguide: FnGuideClient,
    store: SnapshotStore,
}

impl UniverseRefresher {
    /// 기본 클라이언트로 생성.
    pub fn new(config: CollectorConfig) -> Self {
        Self::with_sources(
            config,
            KrxEtfSource::new(),
            NaverMobileClient::new(),
            FnGuideClient::new(),
        )
    }

    /// 소스 클라이언트를 주입해 생성 (테스트용).
    pub fn with_sources(
        config: CollectorConfig,
        krx: KrxEtfSource,
        naver: NaverMobileClient,
        fnguide: FnGuideClient,
    ) -> Self {
        let store = SnapshotStore::new(config.snapshot_path());
        Self {
            config,
            krx,
            naver,
            fnguide,
            store,
        }
    }

    /// 스냅샷 저장소 참조 (검증/조회용).
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// 전체 갱신 파이프라인 실행.
    ///
    /// `targets`가 None이거나 비면 전체 유니버스를 갱신합니다. 취소되지
    /// 않고 완료된 경우에만 스냅샷을 병합 저장합니다.
    pub async fn run_refresh(
        &self,
        targets: Option<Vec<String>>,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<RefreshSummary> {
        let started = Instant::now();
        let today = Local::now().date_naive();

        // 전체 시세 조회는 비싼 단계라 시작 전에 취소를 먼저 확인
        if cancel.is_cancelled() {
            return Ok(RefreshSummary::cancelled(0, 0));
        }

        progress.report("KRX 시세 조회 중...", 0);
        let mut table = price_table::build(
            &self.krx,
            today,
            self.config.refresh.krx_step_back_days,
        )
        .await;

        if table.is_empty() {
            warn!("KRX 전체 조회 실패, 캐시된 스냅샷 확인");
            match self.store.synthetic_close_tables() {
                Ok(tables) if !tables.is_empty() => {
                    info!(tickers = tables.len(), "캐시된 스냅샷으로 진행");
                    table = PriceTable::from_synthetic(tables);
                }
                _ => {
                    let message = "갱신 실패: KRX 응답 없음, 캐시된 스냅샷 없음";
                    progress.report(message, 0);
                    return Ok(RefreshSummary::failed(message));
                }
            }
        }

        progress.report("ETF 목록 조회 중...", 5);
        let resolved = discovery::resolve_targets(
            &self.naver,
            targets.as_deref(),
            &table,
            self.config.refresh.full_universe_threshold,
        )
        .await;

        if resolved.tickers.is_empty() {
            return Ok(RefreshSummary::completed(0, 0, 0, "처리할 ETF 없음"));
        }

        let manual = load_manual_history(&self.config.manual_history_path());
        let reconciler = Reconciler::new(
            &self.naver,
            &self.fnguide,
            &manual,
            self.config.refresh.history_pages,
            today,
        );

        let total = resolved.tickers.len();
        let mut stats = RefreshStats {
            total,
            skipped: resolved.skipped,
            ..RefreshStats::new()
        };

        let table_ref = &table;
        let reconciler_ref = &reconciler;
        let mut tasks = stream::iter(resolved.tickers.iter().map(|ticker| async move {
            let closes = table_ref.closes_for(ticker);
            (ticker.clone(), reconciler_ref.reconcile(ticker, closes).await)
        }))
        .buffer_unordered(self.config.refresh.max_concurrency);

        let mut results: HashMap<String, _> = HashMap::new();
        let mut processed = 0;
        while !cancel.is_cancelled() {
            let Some((ticker, record)) = tasks.next().await else {
                break;
            };
            processed += 1;

            match record {
                Some(record) => {
                    results.insert(ticker, record);
                    stats.success += 1;
                }
                None => {
                    stats.errors += 1;
                }
            }

            let percent = (processed * 100 / total) as u8;
            progress.report(&format!("분배금 수집 ({}/{})", processed, total), percent);
        }
        drop(tasks);

        if cancel.is_cancelled() {
            // 부분 결과는 스냅샷에 쓰지 않는다
            info!(processed, total, "갱신 취소됨");
            return Ok(RefreshSummary::cancelled(processed, total));
        }

        let updated = results.len();
        let snapshot_total = self.store.merge_write(results)?;

        stats.elapsed = started.elapsed();
        stats.log_summary("유니버스 갱신");

        let message = format!(
            "완료: {}종목 갱신 (스냅샷 {}종목)",
            updated, snapshot_total
        );
        progress.report(&message, 100);
        Ok(RefreshSummary::completed(updated, processed, total, message))
    }

    /// 빠른 시세 갱신 경로.
    ///
    /// 배당/이력 작업 없이 시세·등락·분봉만 받아오며, 정합 경로보다 높은
    /// 동시 요청 상한을 씁니다. 스냅샷은 건드리지 않습니다.
    pub async fn refresh_quotes_only(
        &self,
        tickers: &[String],
    ) -> HashMap<String, QuoteSnapshot> {
        let mut tasks = stream::iter(tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.fetch_quote(ticker).await)
        }))
        .buffer_unordered(self.config.refresh.quote_concurrency);

        let mut quotes = HashMap::new();
        while let Some((ticker, quote)) = tasks.next().await {
            if let Some(quote) = quote {
                quotes.insert(ticker, quote);
            }
        }

        info!(requested = tickers.len(), fetched = quotes.len(), "시세 갱신 완료");
        quotes
    }

    /// 한 종목의 시세만 조회 (ETF 시세 → 일반 종목 시세 폴백).
    async fn fetch_quote(&self, ticker: &str) -> Option<QuoteSnapshot> {
        let (trend, etf_quote) = tokio::join!(
            self.naver.intraday_trend(ticker),
            self.naver.etf_basic(ticker),
        );

        if let Some(quote) = etf_quote {
            if quote.close_price > 0 {
                let mut change_value = quote.change_value;
                if quote.change_rate < 0.0 && change_value > 0 {
                    change_value = -change_value;
                }
                return Some(QuoteSnapshot {
                    name: quote.name,
                    price: quote.close_price,
                    change_value,
                    change_rate: quote.change_rate,
                    trend_1d: trend,
                });
            }
        }

        let stock = self.naver.stock_basic(ticker).await?;
        let name = if stock.name.is_empty() {
            ticker.to_string()
        } else {
            stock.name
        };
        Some(QuoteSnapshot {
            name,
            price: stock.close_price,
            change_value: stock.change_value,
            change_rate: stock.change_rate,
            trend_1d: trend,
        })
    }
}
