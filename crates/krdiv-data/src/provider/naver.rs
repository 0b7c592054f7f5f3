//! 네이버 증권 모바일 API 클라이언트.
//!
//! ETF/종목 기본 시세, 분배금 이력, 일별 시세, 분봉 추세, ETF 전체 목록을
//! 수집합니다.
//!
//! ## 데이터 소스
//! - `m.stock.naver.com/api/etf/{ticker}/basic`: ETF 기본 시세
//! - `m.stock.naver.com/api/stock/{ticker}/basic`: 일반 종목 기본 시세 (폴백)
//! - `m.stock.naver.com/api/etf/{ticker}/dividend/history`: 분배금 이력
//! - `m.stock.naver.com/api/stock/{ticker}/price`: 일별 시세 (페이지네이션)
//! - `api.stock.naver.com/chart/domestic/item/{ticker}`: 당일 분봉
//! - `finance.naver.com/api/sise/etfItemList.nhn`: ETF 전체 목록
//!
//! ## 재시도 정책
//! 403/429(차단·속도 제한)와 네트워크 오류는 고정 백오프 후 재시도하며
//! 최대 3회까지 시도합니다. 그 밖의 비정상 상태 코드는 즉시 빈 결과로
//! 수렴합니다.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use krdiv_core::DistributionRow;

use super::{decode_korean_bytes, parse_date_any, parse_f64_clean, parse_i64_clean,
    BROWSER_USER_AGENT};

/// 모바일 API 기본 URL.
const MOBILE_API_URL: &str = "https://m.stock.naver.com";

/// 차트(분봉) API 기본 URL.
const CHART_API_URL: &str = "https://api.stock.naver.com";

/// 데스크톱 금융 API 기본 URL (ETF 목록).
const FINANCE_API_URL: &str = "https://finance.naver.com";

/// 재시도 최대 횟수.
const MAX_ATTEMPTS: u32 = 3;

/// 구간별 사전 계산 수익률 (%). 0은 미제공.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodReturns {
    /// 1개월
    pub m1: f64,
    /// 3개월
    pub m3: f64,
    /// 6개월
    pub m6: f64,
    /// 1년
    pub y1: f64,
}

impl PeriodReturns {
    /// 모든 구간이 비어 있는지.
    pub fn is_empty(&self) -> bool {
        self.m1 == 0.0 && self.m3 == 0.0 && self.m6 == 0.0 && self.y1 == 0.0
    }
}

/// 기본 시세 응답 (ETF/일반 종목 공통 형태로 정규화).
#[derive(Debug, Clone, Default)]
pub struct BasicQuote {
    /// 종목명
    pub name: String,
    /// 종가 (원)
    pub close_price: i64,
    /// 전일 대비 등락폭 (원, 부호 정규화됨)
    pub change_value: i64,
    /// 전일 대비 등락률 (%)
    pub change_rate: f64,
    /// 분류 텍스트 (ETF 유형 또는 기초지수명, 일반 종목은 업종명)
    pub sector: String,
    /// 사전 계산 구간 수익률
    pub returns: PeriodReturns,
}

impl BasicQuote {
    /// 시세와 종목명이 모두 쓸 만한지 (폴백 판단 기준).
    pub fn is_usable(&self) -> bool {
        self.close_price > 0 && !self.name.is_empty()
    }
}

/// 일별 시세 한 건.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가 (원)
    pub close: i64,
}

/// 네이버 증권 모바일 API 클라이언트.
pub struct NaverMobileClient {
    client: reqwest::Client,
    mobile_base: String,
    chart_base: String,
    finance_base: String,
    /// 차단 시 재시도 전 대기 시간 (기본 1초)
    retry_backoff: Duration,
}

impl NaverMobileClient {
    /// 기본 설정으로 생성.
    pub fn new() -> Self {
        Self::with_base_urls(MOBILE_API_URL, CHART_API_URL, FINANCE_API_URL)
    }

    /// 모든 엔드포인트를 한 서버로 돌리는 생성자 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self::with_base_urls(base.clone(), base.clone(), base)
    }

    fn with_base_urls(
        mobile_base: impl Into<String>,
        chart_base: impl Into<String>,
        finance_base: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            mobile_base: mobile_base.into(),
            chart_base: chart_base.into(),
            finance_base: finance_base.into(),
            retry_backoff: Duration::from_secs(1),
        }
    }

    /// 재시도 백오프 변경 (테스트에서 대기 시간 단축용).
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn referer(&self, ticker: &str) -> String {
        format!("{}/domestic/stock/{}/total", self.mobile_base, ticker)
    }

    /// 재시도 포함 JSON GET.
    ///
    /// 403/429와 네트워크 오류는 백오프 후 재시도, 그 외 비정상 상태는
    /// 즉시 None.
    async fn get_json_with_retry(&self, url: &str, referer: &str) -> Option<Value> {
        for attempt in 1..=MAX_ATTEMPTS {
            let result = self
                .client
                .get(url)
                .header("Referer", referer)
                .header("Accept", "application/json, text/plain, */*")
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.bytes().await {
                            Ok(bytes) => {
                                let text = decode_korean_bytes(&bytes);
                                match serde_json::from_str(&text) {
                                    Ok(value) => return Some(value),
                                    Err(e) => {
                                        debug!(url, error = %e, "네이버 응답 파싱 실패");
                                        return None;
                                    }
                                }
                            }
                            Err(e) => {
                                debug!(url, error = %e, "네이버 응답 본문 읽기 실패");
                            }
                        }
                    } else if status.as_u16() == 403 || status.as_u16() == 429 {
                        debug!(url, %status, attempt, "네이버 요청 차단, 재시도 대기");
                    } else {
                        debug!(url, %status, "네이버 비정상 상태, 중단");
                        return None;
                    }
                }
                Err(e) => {
                    debug!(url, error = %e, attempt, "네이버 요청 실패, 재시도 대기");
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.retry_backoff).await;
            }
        }
        None
    }

    /// ETF 기본 시세 조회. 실패 시 None.
    pub async fn etf_basic(&self, ticker: &str) -> Option<BasicQuote> {
        let url = format!("{}/api/etf/{}/basic", self.mobile_base, ticker);
        let data = self.get_json_with_retry(&url, &self.referer(ticker)).await?;
        let result = unwrap_result(&data)?;

        let change_rate = json_f64(result, "fluctuationsRatio")
            .or_else(|| json_f64(result, "fluctuationRate"))
            .unwrap_or(0.0);

        // ETF 유형이 없거나 'Etc'면 기초지수명으로 대체
        let mut sector = json_string(result, "etfType");
        if (sector.is_empty() || sector == "Etc") && !json_string(result, "baseIndexName").is_empty()
        {
            sector = json_string(result, "baseIndexName");
        }

        Some(BasicQuote {
            name: json_string(result, "stockName"),
            close_price: json_i64(result, "closePrice"),
            change_value: json_i64(result, "compareToPreviousClosePrice"),
            change_rate,
            sector,
            returns: PeriodReturns {
                m1: json_f64(result, "returnRate1m").unwrap_or(0.0),
                m3: json_f64(result, "returnRate3m").unwrap_or(0.0),
                m6: json_f64(result, "returnRate6m").unwrap_or(0.0),
                y1: json_f64(result, "returnRate1y").unwrap_or(0.0),
            },
        })
    }

    /// 일반 종목 기본 시세 조회 (ETF API 폴백). 실패 시 None.
    ///
    /// 등락폭은 `compareToPreviousPrice.name`의 상승/하락 표기에 맞춰
    /// 부호를 정규화합니다.
    pub async fn stock_basic(&self, ticker: &str) -> Option<BasicQuote> {
        let url = format!("{}/api/stock/{}/basic", self.mobile_base, ticker);
        let data = self.get_json_with_retry(&url, &self.referer(ticker)).await?;
        let result = unwrap_result(&data)?;

        let mut change_rate = json_f64(result, "fluctuationsRatio").unwrap_or(0.0);
        let mut change_value = json_i64(result, "compareToPreviousClosePrice");

        let direction = result
            .get("compareToPreviousPrice")
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("");
        match direction {
            "FALLING" | "SHOCK" | "LOWER_LIMIT" => {
                change_value = -change_value.abs();
                change_rate = -change_rate.abs();
            }
            "RISING" | "UPPER_LIMIT" => {
                change_value = change_value.abs();
                change_rate = change_rate.abs();
            }
            _ => {}
        }

        Some(BasicQuote {
            name: json_string(result, "stockName"),
            close_price: json_i64(result, "closePrice"),
            change_value,
            change_rate,
            sector: json_string(result, "industryCodeName"),
            returns: PeriodReturns::default(),
        })
    }

    /// 분배금 이력 조회 (1페이지 × 24건). 실패 시 빈 목록.
    pub async fn dividend_history(&self, ticker: &str) -> Vec<DistributionRow> {
        let url = format!(
            "{}/api/etf/{}/dividend/history?page=1&pageSize=24&firstPageSize=24",
            self.mobile_base, ticker
        );
        let Some(data) = self.get_json_with_retry(&url, &self.referer(ticker)).await else {
            return Vec::new();
        };

        let Some(items) = data.get("result").and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let date_text = json_string(item, "exDividendAt").replace('.', "-");
            let amount = json_i64(item, "dividendAmount");
            if let Some(date) = parse_date_any(&date_text) {
                if amount > 0 {
                    rows.push(DistributionRow { date, amount });
                }
            }
        }
        rows
    }

    /// 일별 시세 이력 조회 (페이지당 20건, 최대 `pages` 페이지).
    ///
    /// 빈 페이지가 나오면 조기 종료하고, 차단된 페이지가 나오면 그 회차의
    /// 부분 결과를 버리고 전체를 재시도합니다. 재시도 소진 시 빈 목록
    /// (부분 이력은 돌려주지 않음 — 호출자가 다른 소스로 폴백).
    pub async fn price_history(&self, ticker: &str, pages: u32) -> Vec<PricePoint> {
        let referer = self.referer(ticker);

        for attempt in 1..=MAX_ATTEMPTS {
            let mut history = Vec::new();
            let mut blocked = false;

            'pages: for page in 1..=pages {
                let url = format!(
                    "{}/api/stock/{}/price?pageSize=20&page={}",
                    self.mobile_base, ticker, page
                );

                let response = self
                    .client
                    .get(&url)
                    .header("Referer", &referer)
                    .header("Accept", "application/json, text/plain, */*")
                    .send()
                    .await;

                match response {
                    Ok(r) if r.status().is_success() => {
                        let Ok(bytes) = r.bytes().await else {
                            blocked = true;
                            break 'pages;
                        };
                        let text = decode_korean_bytes(&bytes);
                        let Ok(value) = serde_json::from_str::<Value>(&text) else {
                            break 'pages;
                        };
                        let Some(items) = value.as_array() else {
                            break 'pages;
                        };
                        if items.is_empty() {
                            // 이력 끝
                            break 'pages;
                        }
                        for item in items {
                            let date = parse_date_any(&json_string(item, "localTradedAt"));
                            let close = json_i64(item, "closePrice");
                            if let Some(date) = date {
                                if close > 0 {
                                    history.push(PricePoint { date, close });
                                }
                            }
                        }
                    }
                    Ok(r) if matches!(r.status().as_u16(), 403 | 429) => {
                        blocked = true;
                        break 'pages;
                    }
                    Ok(_) => break 'pages,
                    Err(_) => {
                        blocked = true;
                        break 'pages;
                    }
                }
            }

            if !blocked && !history.is_empty() {
                return history;
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.retry_backoff).await;
            }
        }

        warn!(ticker, "네이버 일별 시세 조회 실패");
        Vec::new()
    }

    /// 당일 분봉 추세 샘플 조회. 실패 시 빈 목록 (best-effort).
    pub async fn intraday_trend(&self, ticker: &str) -> Vec<f64> {
        let url = format!(
            "{}/chart/domestic/item/{}?periodType=day",
            self.chart_base, ticker
        );
        let Some(data) = self.get_json_with_retry(&url, &self.referer(ticker)).await else {
            return Vec::new();
        };

        let Some(infos) = data.get("priceInfos").and_then(Value::as_array) else {
            return Vec::new();
        };

        infos
            .iter()
            .filter_map(|p| {
                let price = json_f64(p, "currentPrice")
                    .filter(|v| *v > 0.0)
                    .or_else(|| json_f64(p, "closePrice").filter(|v| *v > 0.0))?;
                Some(price)
            })
            .collect()
    }

    /// ETF 전체 목록 조회 (종목코드 → 종목명). 실패 시 빈 맵.
    ///
    /// 이 엔드포인트는 charset 선언 없는 EUC-KR 본문을 돌려주는 경우가
    /// 있어 바이트 단위로 읽어 디코딩합니다.
    pub async fn etf_directory(&self) -> HashMap<String, String> {
        let url = format!("{}/api/sise/etfItemList.nhn", self.finance_base);
        let Some(data) = self.get_json_with_retry(&url, &self.finance_base).await else {
            warn!("네이버 ETF 목록 조회 실패");
            return HashMap::new();
        };

        let Some(items) = data
            .get("result")
            .and_then(|r| r.get("etfItemList"))
            .and_then(Value::as_array)
        else {
            return HashMap::new();
        };

        let mut directory = HashMap::with_capacity(items.len());
        for item in items {
            let code = json_string(item, "itemcode");
            let name = json_string(item, "itemname");
            if !code.is_empty() {
                directory.insert(code, name);
            }
        }

        debug!(count = directory.len(), "네이버 ETF 목록 수신");
        directory
    }
}

impl Default for NaverMobileClient {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== 파싱 유틸리티 함수 ====================

/// "result" 키가 있으면 그 아래, 없으면 최상위 객체 반환.
///
/// 네이버 모바일 API는 같은 엔드포인트가 중첩/평면 응답을 섞어 씁니다.
fn unwrap_result(data: &Value) -> Option<&Value> {
    let obj = data.as_object()?;
    match obj.get("result") {
        Some(inner) if inner.is_object() => Some(inner),
        _ => Some(data),
    }
}

/// 숫자 또는 문자열 값에서 i64 추출 ("35,120" 같은 표기 허용). 실패 시 0.
fn json_i64(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| {
            n.as_f64().map(|f| f.round() as i64).unwrap_or(0)
        }),
        Some(Value::String(s)) => parse_i64_clean(s),
        _ => 0,
    }
}

/// 숫자 또는 문자열 값에서 f64 추출. 키가 없거나 0이면 None.
fn json_f64(value: &Value, key: &str) -> Option<f64> {
    let parsed = match value.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_f64_clean(s),
        _ => return None,
    };
    (parsed != 0.0).then_some(parsed)
}

/// 문자열 값 추출. 없으면 빈 문자열.
fn json_string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_result_nested_and_flat() {
        let nested = json!({"result": {"stockName": "KODEX 200"}});
        assert_eq!(
            json_string(unwrap_result(&nested).unwrap(), "stockName"),
            "KODEX 200"
        );

        let flat = json!({"stockName": "TIGER 200"});
        assert_eq!(
            json_string(unwrap_result(&flat).unwrap(), "stockName"),
            "TIGER 200"
        );
    }

    #[test]
    fn test_json_i64_accepts_string_and_number() {
        let v = json!({"a": "35,120", "b": 100, "c": 12.6, "d": null});
        assert_eq!(json_i64(&v, "a"), 35_120);
        assert_eq!(json_i64(&v, "b"), 100);
        assert_eq!(json_i64(&v, "c"), 13);
        assert_eq!(json_i64(&v, "d"), 0);
        assert_eq!(json_i64(&v, "missing"), 0);
    }

    #[test]
    fn test_json_f64_treats_zero_as_missing() {
        let v = json!({"a": 1.25, "b": "-0.43", "c": 0});
        assert_eq!(json_f64(&v, "a"), Some(1.25));
        assert_eq!(json_f64(&v, "b"), Some(-0.43));
        assert_eq!(json_f64(&v, "c"), None);
    }

    #[tokio::test]
    async fn test_etf_basic_parses_nested_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/etf/069500/basic")
            .with_status(200)
            .with_body(
                r#"{"result": {
                    "stockName": "KODEX 200",
                    "closePrice": "35,120",
                    "compareToPreviousClosePrice": "120",
                    "fluctuationsRatio": "0.34",
                    "etfType": "Etc",
                    "baseIndexName": "코스피 200",
                    "returnRate1m": 1.2,
                    "returnRate3m": -0.5,
                    "returnRate6m": 4.1,
                    "returnRate1y": 12.3
                }}"#,
            )
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let quote = client.etf_basic("069500").await.unwrap();

        assert_eq!(quote.name, "KODEX 200");
        assert_eq!(quote.close_price, 35_120);
        assert_eq!(quote.change_value, 120);
        assert!((quote.change_rate - 0.34).abs() < 1e-9);
        assert_eq!(quote.sector, "코스피 200");
        assert!((quote.returns.y1 - 12.3).abs() < 1e-9);
        assert!(quote.is_usable());
    }

    #[tokio::test]
    async fn test_stock_basic_normalizes_falling_sign() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/stock/458730/basic")
            .with_status(200)
            .with_body(
                r#"{
                    "stockName": "TIGER 미국배당다우존스",
                    "closePrice": "10,525",
                    "compareToPreviousClosePrice": "35",
                    "fluctuationsRatio": "0.33",
                    "compareToPreviousPrice": {"name": "FALLING"},
                    "industryCodeName": ""
                }"#,
            )
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let quote = client.stock_basic("458730").await.unwrap();

        assert_eq!(quote.close_price, 10_525);
        assert_eq!(quote.change_value, -35);
        assert!((quote.change_rate + 0.33).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_dividend_history_skips_zero_amounts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/api/etf/458730/dividend/history?page=1&pageSize=24&firstPageSize=24",
            )
            .with_status(200)
            .with_body(
                r#"{"result": [
                    {"exDividendAt": "2026.07.01", "dividendAmount": "35"},
                    {"exDividendAt": "2026.06.01", "dividendAmount": "0"},
                    {"exDividendAt": "", "dividendAmount": "30"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let rows = client.dividend_history("458730").await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert_eq!(rows[0].amount, 35);
    }

    #[tokio::test]
    async fn test_price_history_stops_on_empty_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/stock/069500/price?pageSize=20&page=1")
            .with_status(200)
            .with_body(
                r#"[
                    {"localTradedAt": "2026-08-03", "closePrice": "35,120"},
                    {"localTradedAt": "2026-08-01", "closePrice": "35,000"}
                ]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/stock/069500/price?pageSize=20&page=2")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let history = client.price_history("069500", 15).await;

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].close, 35_120);
    }

    #[tokio::test]
    async fn test_price_history_blocked_page_yields_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/stock/069500/price?pageSize=20&page=1")
            .with_status(200)
            .with_body(r#"[{"localTradedAt": "2026-08-03", "closePrice": "35,120"}]"#)
            .expect(3)
            .create_async()
            .await;
        server
            .mock("GET", "/api/stock/069500/price?pageSize=20&page=2")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url())
            .with_retry_backoff(Duration::from_millis(1));
        let history = client.price_history("069500", 15).await;

        // 부분 이력은 돌려주지 않는다
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_retry_on_throttle_then_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/etf/069500/basic")
            .with_status(429)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/api/etf/069500/basic")
            .with_status(200)
            .with_body(r#"{"result": {"stockName": "KODEX 200", "closePrice": 35120}}"#)
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url())
            .with_retry_backoff(Duration::from_millis(1));
        let quote = client.etf_basic("069500").await.unwrap();
        assert_eq!(quote.close_price, 35_120);
    }

    #[tokio::test]
    async fn test_non_throttle_error_aborts_immediately() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/etf/069500/basic")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url())
            .with_retry_backoff(Duration::from_millis(1));
        assert!(client.etf_basic("069500").await.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_etf_directory() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/sise/etfItemList.nhn")
            .with_status(200)
            .with_body(
                r#"{"result": {"etfItemList": [
                    {"itemcode": "069500", "itemname": "KODEX 200"},
                    {"itemcode": "458730", "itemname": "TIGER 미국배당다우존스"},
                    {"itemcode": "", "itemname": "무시"}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let directory = client.etf_directory().await;

        assert_eq!(directory.len(), 2);
        assert_eq!(directory["069500"], "KODEX 200");
    }

    #[tokio::test]
    async fn test_intraday_trend_prefers_current_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/chart/domestic/item/069500?periodType=day")
            .with_status(200)
            .with_body(
                r#"{"priceInfos": [
                    {"currentPrice": 35100, "closePrice": 35000},
                    {"closePrice": 35050},
                    {"currentPrice": 0, "closePrice": 0}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NaverMobileClient::with_base_url(server.url());
        let trend = client.intraday_trend("069500").await;

        assert_eq!(trend, vec![35_100.0, 35_050.0]);
    }
}
