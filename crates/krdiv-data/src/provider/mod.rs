//! 업스트림 데이터 소스 어댑터.
//!
//! 각 어댑터는 자신의 경계 밖으로 일시적 장애를 전파하지 않습니다.
//! 재시도 소진/차단/파싱 실패는 빈 결과로 수렴하며, 호출자는 빈 결과를
//! "이 소스에 데이터 없음"으로 취급하고 다음 폴백으로 넘어갑니다.

pub mod fnguide;
pub mod krx;
pub mod naver;

use chrono::NaiveDate;

/// 브라우저 User-Agent (모바일 API가 기본 UA를 차단하는 경우가 있음).
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 숫자 이외 문자를 제거한 문자열 반환 (쉼표/단위 제거).
pub(crate) fn clean_numeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// "1,234원" 같은 문자열을 i64로 파싱. 실패 시 0.
pub(crate) fn parse_i64_clean(text: &str) -> i64 {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() || cleaned == "-" {
        return 0;
    }
    // "1234.0" 형태도 허용
    cleaned
        .parse::<i64>()
        .or_else(|_| cleaned.parse::<f64>().map(|v| v.round() as i64))
        .unwrap_or(0)
}

/// 부호/소수점 포함 실수 파싱. 실패 시 0.0.
pub(crate) fn parse_f64_clean(text: &str) -> f64 {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}

/// 여러 날짜 표기를 허용하는 파서 (YYYY-MM-DD, YYYY/MM/DD, YYYY.MM.DD).
pub(crate) fn parse_date_any(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// utf-8 우선, 실패 시 EUC-KR로 디코딩.
///
/// 네이버 목록 API와 FnGuide 페이지는 charset 선언 없이 EUC-KR 본문을
/// 돌려주는 경우가 있습니다.
pub(crate) fn decode_korean_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::EUC_KR.decode(bytes);
            decoded.into_owned()
        }
    }
}
