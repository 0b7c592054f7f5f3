//! 수동 관리 분배금 이력 테이블.
//!
//! 어떤 라이브 소스에도 이력이 없는 종목을 위해 로컬에서 직접 관리하는
//! JSON 파일입니다. 형식:
//!
//! ```json
//! { "458730": [ {"date": "2026-07-01", "amount": 35} ] }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use krdiv_core::DistributionRow;

use crate::provider::parse_date_any;

/// 수동 이력 파일의 행 (날짜는 여러 표기를 허용하는 문자열).
#[derive(Debug, Deserialize)]
struct ManualRow {
    date: String,
    amount: i64,
}

/// 수동 분배금 이력 로드.
///
/// 파일이 없거나 읽을 수 없으면 빈 맵을 돌려줍니다. 날짜를 파싱할 수
/// 없거나 금액이 0 이하인 행은 건너뜁니다.
pub fn load_manual_history(path: &Path) -> HashMap<String, Vec<DistributionRow>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return HashMap::new(),
    };

    let raw: HashMap<String, Vec<ManualRow>> = match serde_json::from_str(&text) {
        Ok(r) => r,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "수동 이력 파일 파싱 실패, 무시");
            return HashMap::new();
        }
    };

    let mut table = HashMap::with_capacity(raw.len());
    for (ticker, rows) in raw {
        let parsed: Vec<DistributionRow> = rows
            .into_iter()
            .filter_map(|row| {
                let date = parse_date_any(&row.date)?;
                (row.amount > 0).then_some(DistributionRow {
                    date,
                    amount: row.amount,
                })
            })
            .collect();
        if !parsed.is_empty() {
            table.insert(ticker, parsed);
        }
    }

    debug!(path = %path.display(), tickers = table.len(), "수동 이력 로드 완료");
    table
}
