//! FnGuide ETF 스냅샷 페이지 수집기.
//!
//! 보조 정보 제공자의 상세 페이지 마크업을 받아 라벨 기반 휴리스틱으로
//! 값을 추출합니다. 구조화된 파싱이 아니라 "라벨 뒤에서 가장 가까운
//! 숫자/날짜"를 찾는 방식이므로, 추출 로직은 `extract_label_value` 한
//! 곳으로 좁혀 두어 레이아웃이 바뀌면 여기만 고치면 됩니다.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use krdiv_core::{dedup_sort_history, DistributionRow};

use super::{decode_korean_bytes, parse_date_any, parse_i64_clean, BROWSER_USER_AGENT};

/// FnGuide ETF 스냅샷 페이지 기본 URL.
const FNGUIDE_URL: &str = "https://comp.fnguide.com";

/// 분배금 이력 표의 기준일 열 후보.
const DATE_COLUMN_KEYS: &[&str] = &["지급기준일", "분배기준일", "기준일", "지급일", "일자", "날짜"];

/// 분배금 이력 표의 금액 열 후보.
const AMOUNT_COLUMN_KEYS: &[&str] =
    &["분배금(원)", "현금분배(원)", "분배금", "현금분배", "현금 분배", "금액"];

/// FnGuide 상세 페이지 클라이언트.
pub struct FnGuideClient {
    client: reqwest::Client,
    base_url: String,
}

impl FnGuideClient {
    /// 기본 설정으로 생성.
    pub fn new() -> Self {
        Self::with_base_url(FNGUIDE_URL)
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

    /// ETF 스냅샷 페이지 원문 조회. 실패 시 빈 문자열 (best-effort).
    ///
    /// FnGuide는 charset 선언 없이 EUC-KR 본문을 돌려주는 경우가 있어
    /// 바이트 단위로 읽어 utf-8 → EUC-KR 순으로 디코딩합니다.
    pub async fn snapshot_page(&self, ticker: &str) -> String {
        let url = format!(
            "{}/svo2/asp/etf_snapshot.asp?pGB=1&gicode=A{}&cID=&MenuYn=Y&ReportGB=&NewMenuID=106&stkGb=770",
            self.base_url, ticker
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(ticker, error = %e, "FnGuide 페이지 조회 실패");
                return String::new();
            }
        };

        if !response.status().is_success() {
            debug!(ticker, status = %response.status(), "FnGuide 비정상 상태");
            return String::new();
        }

        match response.bytes().await {
            Ok(bytes) => decode_korean_bytes(&bytes),
            Err(e) => {
                debug!(ticker, error = %e, "FnGuide 본문 읽기 실패");
                String::new()
            }
        }
    }
}

impl Default for FnGuideClient {
    fn default() -> Self {
        Self::new()
    }
}

/// 라벨 뒤에서 가장 가까운 숫자/날짜 토큰을 추출합니다.
///
/// 후보 라벨을 순서대로 시도하며, 처음 매칭된 값을 돌려줍니다.
/// dt/dd 구조가 아니어도 잡히도록 마크업 전체를 한 줄로 펴서 탐색합니다.
pub fn extract_label_value(html: &str, labels: &[&str]) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let flat = html.replace(['\n', '\t'], " ");

    for label in labels {
        let pattern = format!(
            r"{}.*?(\d{{4}}[/\.\-]\d{{2}}[/\.\-]\d{{2}}|[0-9]+(?:\.[0-9]+)?)",
            regex::escape(label)
        );
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if let Some(caps) = re.captures(&flat) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// 페이지 제목의 종목명 추출 (`<h1 id="giName">`).
pub fn extract_name(html: &str) -> Option<String> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r#"<h1[^>]*id="giName"[^>]*>(.*?)</h1>"#).expect("종목명 정규식")
    });

    re.captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// 마크업의 HTML 표에서 분배금 이력 추출.
///
/// 기준일/금액 열 후보가 모두 있는 표만 대상으로 하며, 결과는
/// (기준일, 금액) 중복 제거 후 기준일 내림차순입니다. CPU 바운드
/// 파싱이므로 호출자는 `tokio::task::spawn_blocking`으로 돌립니다.
pub fn extract_history_from_tables(html: &str) -> Vec<DistributionRow> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let Ok(table_selector) = Selector::parse("table") else {
        return Vec::new();
    };
    let Ok(tr_selector) = Selector::parse("tr") else {
        return Vec::new();
    };
    let Ok(cell_selector) = Selector::parse("th, td") else {
        return Vec::new();
    };

    let mut rows = Vec::new();

    for table in document.select(&table_selector) {
        let mut table_rows = table.select(&tr_selector);

        // 헤더 행에서 열 인덱스 결정
        let Some(header) = table_rows.next() else {
            continue;
        };
        let header_cells: Vec<String> = header
            .select(&cell_selector)
            .map(|c| c.text().collect::<String>().replace(' ', ""))
            .collect();

        let date_col = find_column(&header_cells, DATE_COLUMN_KEYS);
        let amount_col = find_column(&header_cells, AMOUNT_COLUMN_KEYS);
        let (Some(date_col), Some(amount_col)) = (date_col, amount_col) else {
            continue;
        };

        for tr in table_rows {
            let cells: Vec<String> = tr
                .select(&cell_selector)
                .map(|c| c.text().collect::<String>())
                .collect();
            if cells.len() <= date_col.max(amount_col) {
                continue;
            }

            let date = parse_date_any(&cells[date_col]);
            let amount = parse_i64_clean(&cells[amount_col]);
            if let Some(date) = date {
                if amount > 0 {
                    rows.push(DistributionRow { date, amount });
                }
            }
        }
    }

    dedup_sort_history(rows)
}

/// 열 이름 후보와 매칭되는 첫 헤더 열 인덱스.
fn find_column(header_cells: &[String], keys: &[&str]) -> Option<usize> {
    header_cells.iter().position(|cell| {
        keys.iter()
            .any(|key| cell.contains(&key.replace(' ', "")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_label_value_nearest_number() {
        let html = "<dl><dt>배당수익률</dt><dd><b>3.52</b>%</dd></dl>";
        assert_eq!(
            extract_label_value(html, &["배당수익률", "배당수익률(%)"]),
            Some("3.52".to_string())
        );
    }

    #[test]
    fn test_extract_label_value_date_token() {
        let html = "<td>최근 분배금 지급기준일</td>\n<td>2026/07/01</td>";
        assert_eq!(
            extract_label_value(html, &["최근 분배금 지급기준일"]),
            Some("2026/07/01".to_string())
        );
    }

    #[test]
    fn test_extract_label_value_tries_labels_in_order() {
        let html = "연 분배횟수(회) 12";
        assert_eq!(
            extract_label_value(html, &["연 분배횟수", "연 분배횟수(회)"]),
            Some("12".to_string())
        );
        assert_eq!(extract_label_value(html, &["없는라벨"]), None);
        assert_eq!(extract_label_value("", &["배당수익률"]), None);
    }

    #[test]
    fn test_extract_name() {
        let html = r#"<div><h1 class="tit" id="giName">KODEX 200</h1></div>"#;
        assert_eq!(extract_name(html), Some("KODEX 200".to_string()));
        assert_eq!(extract_name("<h1>다른 제목</h1>"), None);
    }

    #[test]
    fn test_extract_history_from_tables() {
        let html = r#"
            <table>
                <tr><th>지급기준일</th><th>분배금(원)</th></tr>
                <tr><td>2026-07-01</td><td>35</td></tr>
                <tr><td>2026-06-01</td><td>1,200</td></tr>
                <tr><td>2026-07-01</td><td>35</td></tr>
                <tr><td>잘못된날짜</td><td>10</td></tr>
            </table>
            <table>
                <tr><th>무관한</th><th>표</th></tr>
                <tr><td>a</td><td>b</td></tr>
            </table>
        "#;

        let rows = extract_history_from_tables(html);
        assert_eq!(rows.len(), 2);
        // 기준일 내림차순, 중복 제거
        assert_eq!(rows[0], DistributionRow { date: date(2026, 7, 1), amount: 35 });
        assert_eq!(rows[1], DistributionRow { date: date(2026, 6, 1), amount: 1200 });
    }

    #[test]
    fn test_extract_history_requires_both_columns() {
        let html = r#"
            <table>
                <tr><th>지급기준일</th><th>비고</th></tr>
                <tr><td>2026-07-01</td><td>35</td></tr>
            </table>
        "#;
        assert!(extract_history_from_tables(html).is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_page_empty_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"/svo2/asp/etf_snapshot\.asp.*".into()),
            )
            .with_status(500)
            .create_async()
            .await;

        let client = FnGuideClient::with_base_url(server.url());
        assert_eq!(client.snapshot_page("069500").await, "");
    }

    #[tokio::test]
    async fn test_snapshot_page_decodes_euc_kr() {
        let mut server = mockito::Server::new_async().await;
        // "삼성" in EUC-KR
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"/svo2/asp/etf_snapshot\.asp.*".into()),
            )
            .with_status(200)
            .with_body(vec![0xBB, 0xEF, 0xBC, 0xBA])
            .create_async()
            .await;

        let client = FnGuideClient::with_base_url(server.url());
        assert_eq!(client.snapshot_page("069500").await, "삼성");
    }
}
