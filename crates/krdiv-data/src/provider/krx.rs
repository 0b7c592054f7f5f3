//! KRX(한국거래소) ETF 전종목 종가 소스.
//!
//! 정보데이터시스템의 전종목 시세 API로 특정 일자의 ETF 종목코드→종가
//! 테이블을 한 번에 받아옵니다. 종목 단위 필터링은 없으며, 휴장일에는
//! 빈 테이블이 돌아오므로 호출자가 하루씩 되짚어 최근 거래일을 찾습니다.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

use super::BROWSER_USER_AGENT;

/// KRX API 기본 URL.
const KRX_API_URL: &str = "https://data.krx.co.kr/comm/bldAttendant/getJsonData.cmd";

/// KRX ETF 전종목 시세 조회 bld (일별).
const BLD_ETF_ALL: &str = "dbms/MDC/STAT/standard/MDCSTAT04301";

/// KRX 정보데이터시스템 응답 구조 ("output" 배열 키).
#[derive(Debug, Deserialize)]
struct KrxApiResponse {
    #[serde(default)]
    output: Vec<KrxEtfRecord>,
}

/// ETF 전종목 시세 레코드 (사용하는 필드만 매핑).
#[derive(Debug, Deserialize)]
struct KrxEtfRecord {
    /// 종목코드 (6자리)
    #[serde(rename = "ISU_SRT_CD", default)]
    isu_srt_cd: String,

    /// 종가 (쉼표 포함 문자열, 예: "10,525")
    #[serde(rename = "TDD_CLSPRC", default)]
    close: String,
}

/// KRX ETF 종가 테이블 소스.
pub struct KrxEtfSource {
    client: reqwest::Client,
    base_url: String,
}

impl KrxEtfSource {
    /// 새로운 KRX ETF 소스 생성.
    pub fn new() -> Self {
        Self::with_base_url(KRX_API_URL)
    }

    /// 기본 URL을 지정해 생성 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 특정 일자의 ETF 전종목 종가 테이블 조회.
    ///
    /// 휴장일이거나 조회에 실패하면 빈 테이블을 돌려줍니다.
    pub async fn close_table_on(&self, date: NaiveDate) -> HashMap<String, i64> {
        let trd_dd = date.format("%Y%m%d").to_string();
        let params = [("bld", BLD_ETF_ALL), ("trdDd", trd_dd.as_str())];

        let response = match self
            .client
            .post(&self.base_url)
            .header(
                "Referer",
                "https://data.krx.co.kr/contents/MDC/MDI/outerLoader/index.cmd",
            )
            .form(&params)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(date = %trd_dd, error = %e, "KRX API 호출 실패");
                return HashMap::new();
            }
        };

        if !response.status().is_success() {
            warn!(date = %trd_dd, status = %response.status(), "KRX API 오류 응답");
            return HashMap::new();
        }

        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!(date = %trd_dd, error = %e, "KRX 응답 읽기 실패");
                return HashMap::new();
            }
        };

        let api_response: KrxApiResponse = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    date = %trd_dd,
                    error = %e,
                    head = &text[..text.len().min(200)],
                    "KRX 응답 파싱 실패"
                );
                return HashMap::new();
            }
        };

        let mut table = HashMap::with_capacity(api_response.output.len());
        for record in api_response.output {
            let close = parse_krx_close(&record.close);
            if record.isu_srt_cd.is_empty() || close <= 0 {
                continue;
            }
            table.insert(record.isu_srt_cd, close);
        }

        debug!(date = %trd_dd, count = table.len(), "KRX ETF 종가 테이블 수신");
        table
    }

    /// 기준일부터 하루씩 되짚으며 최근 거래일의 종가 테이블 조회.
    ///
    /// `step_back_days` 캘린더 일수 안에 거래일이 없으면 빈 테이블을
    /// 돌려줍니다 (fail-closed).
    pub async fn latest_close_table(
        &self,
        target: NaiveDate,
        step_back_days: u32,
    ) -> HashMap<String, i64> {
        for back in 0..=step_back_days {
            let date = target
                .checked_sub_days(Days::new(back as u64))
                .unwrap_or(target);
            let table = self.close_table_on(date).await;
            if !table.is_empty() {
                return table;
            }
        }

        warn!(
            target = %target,
            window = step_back_days,
            "조회 가능한 KRX 거래일 없음"
        );
        HashMap::new()
    }
}

impl Default for KrxEtfSource {
    fn default() -> Self {
        Self::new()
    }
}

/// KRX 종가 문자열 파싱 (쉼표 제거). 빈 값/"-"는 0.
fn parse_krx_close(s: &str) -> i64 {
    if s.is_empty() || s == "-" {
        return 0;
    }
    s.replace(',', "").parse().unwrap_or(0)
}
