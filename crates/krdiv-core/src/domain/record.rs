//! 유니버스 스냅샷에 저장되는 종목 레코드 정의.
//!
//! `TickerRecord`의 직렬화 필드명은 스냅샷 파일(`dividend_universe.json`)의
//! 외부 계약입니다. 필드 추가는 허용되지만 기존 필드명/의미는 바꾸지 않습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 분배금 이력 한 건 (지급기준일, 금액).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DistributionRow {
    /// 지급기준일 (ex-date)
    pub date: NaiveDate,
    /// 분배금 (원)
    pub amount: i64,
}

/// 과거 시세 조회 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    /// 1개월
    M1,
    /// 3개월
    M3,
    /// 6개월
    M6,
    /// 1년
    Y1,
    /// 3년
    Y3,
    /// 5년
    Y5,
}

impl Horizon {
    /// 전체 구간 (짧은 순).
    pub const ALL: [Horizon; 6] = [
        Horizon::M1,
        Horizon::M3,
        Horizon::M6,
        Horizon::Y1,
        Horizon::Y3,
        Horizon::Y5,
    ];

    /// 기준일로부터의 캘린더 일수.
    pub fn lookback_days(self) -> i64 {
        match self {
            Horizon::M1 => 30,
            Horizon::M3 => 90,
            Horizon::M6 => 180,
            Horizon::Y1 => 365,
            Horizon::Y3 => 365 * 3,
            Horizon::Y5 => 365 * 5,
        }
    }

    /// 표시용 라벨 ("1m", "3y" 등).
    pub fn label(self) -> &'static str {
        match self {
            Horizon::M1 => "1m",
            Horizon::M3 => "3m",
            Horizon::M6 => "6m",
            Horizon::Y1 => "1y",
            Horizon::Y3 => "3y",
            Horizon::Y5 => "5y",
        }
    }
}

/// 한 종목의 구간별 종가 테이블.
///
/// 0은 "해당 구간 시세 없음"을 뜻하는 미상 값입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizonCloses {
    /// 최근 종가
    pub now: i64,
    /// 1개월 전 종가
    pub m1: i64,
    /// 3개월 전 종가
    pub m3: i64,
    /// 6개월 전 종가
    pub m6: i64,
    /// 1년 전 종가
    pub y1: i64,
    /// 3년 전 종가
    pub y3: i64,
    /// 5년 전 종가
    pub y5: i64,
}

impl HorizonCloses {
    /// 구간별 과거 종가 조회.
    pub fn get(&self, horizon: Horizon) -> i64 {
        match horizon {
            Horizon::M1 => self.m1,
            Horizon::M3 => self.m3,
            Horizon::M6 => self.m6,
            Horizon::Y1 => self.y1,
            Horizon::Y3 => self.y3,
            Horizon::Y5 => self.y5,
        }
    }

    /// 구간별 과거 종가 기록.
    pub fn set(&mut self, horizon: Horizon, close: i64) {
        match horizon {
            Horizon::M1 => self.m1 = close,
            Horizon::M3 => self.m3 = close,
            Horizon::M6 => self.m6 = close,
            Horizon::Y1 => self.y1 = close,
            Horizon::Y3 => self.y3 = close,
            Horizon::Y5 => self.y5 = close,
        }
    }
}

/// 유니버스 스냅샷의 단위 레코드.
///
/// 한 번의 정합(reconciliation) 패스에서 통째로 만들어지며,
/// 이후 필드 단위로 수정되지 않습니다. 가격/수익률 필드는 값이 없을 때
/// 0을 기록합니다 (소비자는 0을 "미상"으로 취급).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerRecord {
    /// 종목명
    pub name: String,
    /// 현재가 (원)
    pub price: i64,
    /// 전일 대비 등락률 (%)
    pub daily_change_rate: f64,
    /// 전일 대비 등락폭 (원, 부호 포함)
    pub daily_change_value: i64,

    /// FnGuide 표기 배당수익률 (%)
    #[serde(rename = "yield")]
    pub dividend_yield: f64,
    /// 최근 분배금 (원)
    pub dist_amount_recent: i64,
    /// 최근 분배금 지급기준일 (YYYY-MM-DD 또는 빈 문자열)
    pub dist_base_date: String,
    /// 연 분배횟수 (0 = 미상)
    pub dist_freq_1y: u32,

    /// TTM(최근 365일) 분배금 합계 (원)
    pub dist_ttm_amount: i64,
    /// TTM 분배 횟수
    pub dist_ttm_count: u32,
    /// TTM 내 가장 최근 지급기준일
    pub dist_ttm_last_date: String,
    /// TTM 분배수익률 (%)
    pub dist_ttm_yield: f64,

    /// 추정 연 분배금 (원, TTM 이력이 없을 때만)
    pub est_annual_amount: i64,
    /// 추정 연 분배수익률 (%)
    pub est_annual_yield: f64,
    /// 추정 방식 태그 ("recent_x_freq" 또는 빈 문자열)
    pub est_method: String,

    /// 섹터/전략 분류 라벨
    pub sector: String,
    /// 분배금 이력 (기준일 내림차순)
    pub dist_history: Vec<DistributionRow>,

    /// 총수익 계산에 사용한 연 분배수익률 (%)
    pub income_yield_annual_used: f64,
    /// 총수익 계산에 사용한 연 분배금 (원)
    pub income_amount_annual_used: i64,
    /// 월 현금흐름 추정치 (원)
    pub monthly_income_est: f64,

    /// 어떤 소스에서도 분배수익률을 확정하지 못한 경우 true
    pub dist_warning: bool,
    /// 연수익률 산출 근거 ("TTM" / "EST" / "NONE")
    pub annual_yield_label: String,

    /// 1개월 전 종가 (0 = 미상)
    pub price_1m: i64,
    /// 3개월 전 종가
    pub price_3m: i64,
    /// 6개월 전 종가
    pub price_6m: i64,
    /// 1년 전 종가
    pub price_1y: i64,
    /// 3년 전 종가
    pub price_3y: i64,
    /// 5년 전 종가
    pub price_5y: i64,

    /// 1개월 수익률 (%)
    pub return_1m: f64,
    /// 3개월 수익률 (%)
    pub return_3m: f64,
    /// 6개월 수익률 (%)
    pub return_6m: f64,
    /// 1년 수익률 (%)
    pub return_1y: f64,
    /// 3년 수익률 (%)
    pub return_3y: f64,
    /// 5년 수익률 (%)
    pub return_5y: f64,

    /// 1년 가격 CAGR (%)
    pub price_cagr_1y: f64,
    /// 3년 가격 CAGR (%)
    pub price_cagr_3y: f64,
    /// 5년 가격 CAGR (%)
    pub price_cagr_5y: f64,

    /// 1년 총수익률 (가격+분배, %)
    pub total_return_1y: f64,
    /// 3년 총수익률 (%)
    pub total_return_3y: f64,
    /// 5년 총수익률 (%)
    pub total_return_5y: f64,

    /// 1년 총수익 CAGR (%)
    pub total_cagr_1y: f64,
    /// 3년 총수익 CAGR (%)
    pub total_cagr_3y: f64,
    /// 5년 총수익 CAGR (%)
    pub total_cagr_5y: f64,

    /// 당일 분봉 추세 샘플
    pub trend_1d: Vec<f64>,
    /// 마지막 갱신일 (YYYY-MM-DD)
    pub last_updated: String,
}

impl TickerRecord {
    /// 저장된 수익률로부터 구간별 과거 종가를 역산합니다.
    ///
    /// `past = now / (1 + return/100)`. 수익률이 0이거나 현재가가 0이면
    /// 해당 구간은 미상(0)으로 둡니다. 신규 상장 종목에 0% 변동이라는
    /// 가짜 데이터가 생기지 않도록 하기 위함입니다.
    pub fn synthetic_closes(&self) -> HorizonCloses {
        let mut closes = HorizonCloses {
            now: self.price,
            ..Default::default()
        };

        let returns = [
            (Horizon::M1, self.return_1m),
            (Horizon::M3, self.return_3m),
            (Horizon::M6, self.return_6m),
            (Horizon::Y1, self.return_1y),
            (Horizon::Y3, self.return_3y),
            (Horizon::Y5, self.return_5y),
        ];

        for (horizon, ret) in returns {
            if self.price > 0 && ret != 0.0 {
                let past = (self.price as f64 / (1.0 + ret / 100.0)).round() as i64;
                closes.set(horizon, past);
            }
        }

        closes
    }

    /// 구간별 과거 종가 조회 (`price_1m` 등).
    pub fn horizon_price(&self, horizon: Horizon) -> i64 {
        match horizon {
            Horizon::M1 => self.price_1m,
            Horizon::M3 => self.price_3m,
            Horizon::M6 => self.price_6m,
            Horizon::Y1 => self.price_1y,
            Horizon::Y3 => self.price_3y,
            Horizon::Y5 => self.price_5y,
        }
    }
}

/// 빠른 시세 갱신 경로의 결과 (배당/이력 작업 없음).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// 종목명
    pub name: String,
    /// 현재가 (원)
    pub price: i64,
    /// 전일 대비 등락폭 (원, 부호 포함)
    pub change_value: i64,
    /// 전일 대비 등락률 (%)
    pub change_rate: f64,
    /// 당일 분봉 추세 샘플
    pub trend_1d: Vec<f64>,
}
