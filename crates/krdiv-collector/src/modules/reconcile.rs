//! 종목 단위 정합 엔진.
//!
//! 한 종목에 대해 KRX 구간별 종가, 네이버 시세/분배금/분봉, FnGuide
//! 상세 페이지, 수동 이력 테이블을 하나의 레코드로 합칩니다. 레코드는
//! 이 한 번의 패스에서 통째로 만들어지며, 소스별 폴백 우선순위는
//! 다음과 같습니다.
//!
//! - 현재가: 네이버 종가(양수일 때) > KRX 종가 > 0
//! - 종목명: 네이버 ETF 시세 > FnGuide 페이지 제목 > 네이버 일반 종목
//!   시세 > 종목코드
//! - 분배금 이력: 네이버 피드 > 수동 테이블 > FnGuide HTML 표
//! - 구간 수익률: KRX 역산 > 네이버 사전 계산 > 일별 시세 역산

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use krdiv_core::{
    classify_sector, dedup_sort_history, infer_dist_frequency, price_cagr, return_pct, round2,
    round4, total_cagr, total_return_from_cagr, ttm_summary, DistributionRow, HorizonCloses,
    TickerRecord,
};
use krdiv_data::{
    extract_history_from_tables, extract_label_value, extract_name, BasicQuote, FnGuideClient,
    NaverMobileClient, PricePoint,
};

/// 종목 단위 정합기.
///
/// 클라이언트와 실행 단위 입력(수동 이력, 기준일)을 묶어 들고 다니며,
/// 종목마다 `reconcile` 한 번으로 레코드를 만듭니다.
pub struct Reconciler<'a> {
    naver: &'a NaverMobileClient,
    fnguide: &'a FnGuideClient,
    manual: &'a HashMap<String, Vec<DistributionRow>>,
    history_pages: u32,
    today: NaiveDate,
}

impl<'a> Reconciler<'a> {
    /// 정합기 생성.
    pub fn new(
        naver: &'a NaverMobileClient,
        fnguide: &'a FnGuideClient,
        manual: &'a HashMap<String, Vec<DistributionRow>>,
        history_pages: u32,
        today: NaiveDate,
    ) -> Self {
        Self {
            naver,
            fnguide,
            manual,
            history_pages,
            today,
        }
    }

    /// 한 종목의 레코드 생성.
    ///
    /// 복구 불가능한 실패 시 `None`이며, 호출자는 이번 실행에서 해당
    /// 종목만 건너뜁니다 (배치 전체 실패 아님).
    pub async fn reconcile(&self, ticker: &str, closes: HorizonCloses) -> Option<TickerRecord> {
        // FnGuide 페이지 + 네이버 시세/분배 이력/분봉 동시 조회
        let (html, etf_quote, naver_history, trend) = tokio::join!(
            self.fnguide.snapshot_page(ticker),
            self.naver.etf_basic(ticker),
            self.naver.dividend_history(ticker),
            self.naver.intraday_trend(ticker),
        );

        // ETF 시세가 비거나 시세/이름이 없으면 일반 종목 API로 보완
        // (신규 상장 직후나 ETF 외 종목에서 발생)
        let mut quote = etf_quote.unwrap_or_default();
        let mut stock_quote: Option<BasicQuote> = None;
        if !quote.is_usable() {
            stock_quote = self.naver.stock_basic(ticker).await;
            if let Some(stock) = &stock_quote {
                if quote.name.is_empty() {
                    quote.name = stock.name.clone();
                }
                if quote.close_price <= 0 {
                    quote.close_price = stock.close_price;
                }
                if quote.change_rate == 0.0 {
                    quote.change_rate = stock.change_rate;
                }
                if quote.change_value == 0 {
                    quote.change_value = stock.change_value;
                }
                if quote.sector.is_empty() || quote.sector == "Etc" {
                    quote.sector = stock.sector.clone();
                }
            }
        }

        // 등락률에는 부호가 있지만 등락폭은 절대값으로 오는 경우 보정
        let daily_change_rate = quote.change_rate;
        let mut daily_change_value = quote.change_value;
        if daily_change_rate < 0.0 && daily_change_value > 0 {
            daily_change_value = -daily_change_value;
        }

        // 현재가: 네이버 종가 우선, 둘 다 없으면 0 (소비자는 0을 미상으로 취급)
        let price_now = if quote.close_price > 0 {
            quote.close_price
        } else {
            closes.now
        };

        // 사전 계산 수익률이 대부분 비면 약 1년 치 일별 시세로 역산.
        // 분봉과 별개로 최소 1페이지는 받아 둔다.
        let needs_history = quote.returns.is_empty() || quote.returns.m6 == 0.0;
        let pages = if needs_history { self.history_pages } else { 1 };
        let price_history = self.naver.price_history(ticker, pages).await;

        let mut naver_returns = quote.returns;
        for (slot, days) in [
            (&mut naver_returns.m1, 30),
            (&mut naver_returns.m3, 90),
            (&mut naver_returns.m6, 180),
            (&mut naver_returns.y1, 365),
        ] {
            if *slot == 0.0 {
                let derived = history_return(&price_history, days, self.today);
                if derived != 0.0 {
                    *slot = round2(derived);
                }
            }
        }

        // FnGuide 라벨 추출 (휴리스틱, 실패는 전부 0/빈값)
        let fnguide_yield = extract_label_value(&html, &["배당수익률", "배당수익률(%)"])
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let dist_amount_recent = extract_label_value(&html, &["최근 분배금", "최근 분배금(원)"])
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let dist_base_date =
            extract_label_value(&html, &["최근 분배금 지급기준일"]).unwrap_or_default();
        let mut dist_freq_1y = extract_label_value(&html, &["연 분배횟수", "연 분배횟수(회)"])
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        // 종목명 폴백 체인
        let mut name = quote.name.clone();
        if name.is_empty() {
            if let Some(extracted) = extract_name(&html) {
                name = extracted;
            }
        }
        if name.is_empty() || name == ticker {
            if stock_quote.is_none() {
                stock_quote = self.naver.stock_basic(ticker).await;
            }
            if let Some(stock) = &stock_quote {
                if !stock.name.is_empty() {
                    name = stock.name.clone();
                }
            }
        }
        if name.is_empty() {
            name = ticker.to_string();
        }

        // 분배금 이력 폴백 체인
        let mut history = naver_history;
        if history.is_empty() {
            if let Some(rows) = self.manual.get(ticker) {
                debug!(ticker, rows = rows.len(), "수동 분배금 이력 사용");
                history = rows.clone();
            }
        }
        if history.is_empty() && !html.is_empty() {
            // HTML 표 파싱은 CPU 바운드라 블로킹 풀로 내린다
            let page = html.clone();
            match tokio::task::spawn_blocking(move || extract_history_from_tables(&page)).await {
                Ok(rows) => history = rows,
                Err(e) => {
                    // 파싱 작업이 죽으면 이 종목만 이번 실행에서 빠진다
                    warn!(ticker, error = %e, "FnGuide 표 파싱 작업 실패");
                    return None;
                }
            }
        }
        let history = dedup_sort_history(history);

        // 연 분배횟수가 미상이면 최근 두 기준일 간격으로 추정
        if dist_freq_1y == 0 {
            dist_freq_1y = infer_dist_frequency(&history);
        }

        // TTM 집계
        let ttm = ttm_summary(&history, self.today);
        let dist_ttm_yield = if ttm.count > 0 && price_now > 0 {
            round4(ttm.amount as f64 / price_now as f64 * 100.0)
        } else {
            0.0
        };

        // TTM 이력이 전혀 없을 때만 최근 분배금 × 연 분배횟수로 추정
        let mut est_annual_amount = 0i64;
        let mut est_annual_yield = 0.0;
        let mut est_method = String::new();
        if ttm.count == 0 && dist_amount_recent > 0 && dist_freq_1y > 0 && price_now > 0 {
            est_annual_amount = dist_amount_recent * dist_freq_1y as i64;
            est_annual_yield = round4(est_annual_amount as f64 / price_now as f64 * 100.0);
            est_method = "recent_x_freq".to_string();
        }

        // 구간 수익률: KRX 역산 우선, 빈 구간은 네이버 값으로
        let krx_return = |past: i64| if past > 0 { return_pct(price_now, past) } else { 0.0 };
        let mut return_1m = krx_return(closes.m1);
        let mut return_3m = krx_return(closes.m3);
        let mut return_6m = krx_return(closes.m6);
        let mut return_1y = krx_return(closes.y1);
        let return_3y = krx_return(closes.y3);
        let return_5y = krx_return(closes.y5);
        if return_1m == 0.0 {
            return_1m = naver_returns.m1;
        }
        if return_3m == 0.0 {
            return_3m = naver_returns.m3;
        }
        if return_6m == 0.0 {
            return_6m = naver_returns.m6;
        }
        if return_1y == 0.0 {
            return_1y = naver_returns.y1;
        }

        let price_cagr_1y = price_cagr(price_now, closes.y1, 1.0);
        let price_cagr_3y = price_cagr(price_now, closes.y3, 3.0);
        let price_cagr_5y = price_cagr(price_now, closes.y5, 5.0);

        // 총수익 계산에 쓰는 연 분배수익률: TTM 우선, 없으면 추정치
        let income_yield_annual = if dist_ttm_yield > 0.0 {
            dist_ttm_yield
        } else {
            est_annual_yield
        };
        let income_amount_annual = if ttm.amount > 0 {
            ttm.amount
        } else {
            est_annual_amount
        };
        let monthly_income_est = if income_amount_annual > 0 {
            round2(income_amount_annual as f64 / 12.0)
        } else {
            0.0
        };

        let gated_total = |past: i64, cagr: f64, years: f64| -> (f64, f64) {
            if past <= 0 {
                return (0.0, 0.0);
            }
            let total = total_cagr(cagr, income_yield_annual);
            (total, total_return_from_cagr(total, years))
        };
        let (total_cagr_1y, total_return_1y) = gated_total(closes.y1, price_cagr_1y, 1.0);
        let (total_cagr_3y, total_return_3y) = gated_total(closes.y3, price_cagr_3y, 3.0);
        let (total_cagr_5y, total_return_5y) = gated_total(closes.y5, price_cagr_5y, 5.0);

        let sector = classify_sector(&name, &quote.sector).to_string();

        let annual_yield_label = if dist_ttm_yield > 0.0 {
            "TTM"
        } else if est_annual_yield > 0.0 {
            "EST"
        } else {
            "NONE"
        };

        Some(TickerRecord {
            name,
            price: price_now,
            daily_change_rate: round2(daily_change_rate),
            daily_change_value,

            dividend_yield: fnguide_yield,
            dist_amount_recent,
            dist_base_date,
            dist_freq_1y,

            dist_ttm_amount: ttm.amount,
            dist_ttm_count: ttm.count,
            dist_ttm_last_date: ttm
                .last_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            dist_ttm_yield,

            est_annual_amount,
            est_annual_yield,
            est_method,

            sector,
            dist_history: history,

            income_yield_annual_used: income_yield_annual,
            income_amount_annual_used: income_amount_annual,
            monthly_income_est,

            dist_warning: income_yield_annual == 0.0,
            annual_yield_label: annual_yield_label.to_string(),

            price_1m: closes.m1,
            price_3m: closes.m3,
            price_6m: closes.m6,
            price_1y: closes.y1,
            price_3y: closes.y3,
            price_5y: closes.y5,

            return_1m: round2(return_1m),
            return_3m: round2(return_3m),
            return_6m: round2(return_6m),
            return_1y: round2(return_1y),
            return_3y: round2(return_3y),
            return_5y: round2(return_5y),

            price_cagr_1y: round2(price_cagr_1y),
            price_cagr_3y: round2(price_cagr_3y),
            price_cagr_5y: round2(price_cagr_5y),

            total_return_1y: round2(total_return_1y),
            total_return_3y: round2(total_return_3y),
            total_return_5y: round2(total_return_5y),

            total_cagr_1y: round2(total_cagr_1y),
            total_cagr_3y: round2(total_cagr_3y),
            total_cagr_5y: round2(total_cagr_5y),

            trend_1d: trend,
            last_updated: self.today.format("%Y-%m-%d").to_string(),
        })
    }
}

/// 일별 시세 이력에서 N일 전 대비 수익률 역산.
///
/// 이력은 최근일 우선 내림차순이며, 기준일 이전의 첫 거래일을 과거
/// 종가로 씁니다. 이력이 짧아 기준일에 못 미치면 0 (미상).
fn history_return(history: &[PricePoint], days_ago: u64, today: NaiveDate) -> f64 {
    let Some(latest) = history.first() else {
        return 0.0;
    };
    let cutoff = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);

    for point in history {
        if point.date <= cutoff {
            return return_pct(latest.close, point.close);
        }
    }
    0.0
}
