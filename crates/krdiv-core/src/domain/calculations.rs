//! 수익률/CAGR/TTM 계산 공통 로직.
//!
//! 정합 엔진과 테스트에서 공유하는 순수 계산 함수를 제공합니다.
//! 분모가 0 이하인 경우는 예외 대신 항상 중립값 0.0을 돌려줍니다.
//! 과거 종가 0은 "시세 없음"이며 -100% 손실로 해석하지 않습니다.

use chrono::{Days, NaiveDate};

use super::record::DistributionRow;

/// TTM(최근 365일) 분배금 집계 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtmSummary {
    /// 기간 내 분배금 합계 (원)
    pub amount: i64,
    /// 기간 내 분배 횟수
    pub count: u32,
    /// 기간 내 가장 최근 지급기준일
    pub last_date: Option<NaiveDate>,
}

/// 단순 수익률 (%).
///
/// `(now - past) / past * 100`. 과거 종가가 0 이하이면 0.0.
pub fn return_pct(now: i64, past: i64) -> f64 {
    if past <= 0 {
        return 0.0;
    }
    (now - past) as f64 / past as f64 * 100.0
}

/// 가격 CAGR (%).
///
/// `((now/past)^(1/years) - 1) * 100`. 양 끝 종가가 모두 양수일 때만 계산.
pub fn price_cagr(now: i64, past: i64, years: f64) -> f64 {
    if past <= 0 || now <= 0 || years <= 0.0 {
        return 0.0;
    }
    ((now as f64 / past as f64).powf(1.0 / years) - 1.0) * 100.0
}

/// 가격 CAGR과 연 분배수익률을 복리 합성한 총수익 CAGR (%).
pub fn total_cagr(price_cagr_pct: f64, income_yield_annual_pct: f64) -> f64 {
    let pc = price_cagr_pct / 100.0;
    let iy = income_yield_annual_pct / 100.0;
    ((1.0 + pc) * (1.0 + iy) - 1.0) * 100.0
}

/// 총수익 CAGR을 구간 누적 수익률 (%)로 환산.
pub fn total_return_from_cagr(total_cagr_pct: f64, years: f64) -> f64 {
    let tc = total_cagr_pct / 100.0;
    ((1.0 + tc).powf(years) - 1.0) * 100.0
}

/// 소수점 2자리 반올림 (수익률 필드용).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 소수점 4자리 반올림 (분배수익률 필드용).
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 분배금 이력 정리: (기준일, 금액) 중복 제거 후 기준일 내림차순 정렬.
pub fn dedup_sort_history(mut rows: Vec<DistributionRow>) -> Vec<DistributionRow> {
    rows.sort_unstable();
    rows.dedup();
    rows.reverse();
    rows
}

/// TTM 분배금 집계.
///
/// 입력 순서와 무관하게 같은 결과를 냅니다 (`last_date`는 기간 내 최대 기준일).
pub fn ttm_summary(rows: &[DistributionRow], today: NaiveDate) -> TtmSummary {
    let cutoff = today
        .checked_sub_days(Days::new(365))
        .unwrap_or(NaiveDate::MIN);

    let mut summary = TtmSummary::default();
    for row in rows {
        if row.date >= cutoff {
            summary.amount += row.amount;
            summary.count += 1;
            if summary.last_date.is_none_or(|d| row.date > d) {
                summary.last_date = Some(row.date);
            }
        }
    }
    summary
}

/// 최근 두 지급기준일 간격으로 연 분배횟수를 추정합니다.
///
/// 월배당(~30일), 분기(~90일), 반기(~180일), 연배당(~365일) 구간에
/// 허용 오차를 두고 매칭하며, 어느 구간에도 맞지 않으면 0(미상)입니다.
pub fn infer_dist_frequency(rows: &[DistributionRow]) -> u32 {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    dates.sort_unstable();
    dates.dedup();

    let len = dates.len();
    if len < 2 {
        return 0;
    }

    let gap = (dates[len - 1] - dates[len - 2]).num_days().abs();
    match gap {
        20..=40 => 12,
        80..=110 => 4,
        170..=200 => 2,
        340..=380 => 1,
        _ => 0,
    }
}
