//! 갱신 파이프라인 끝단 검증 (mockito 업스트림 + 임시 스냅샷).

use std::time::Duration;

use chrono::{Days, Local};
use krdiv_collector::{
    CancelToken, CollectorConfig, ProgressReporter, RunStatus, UniverseRefresher,
};
use krdiv_core::Horizon;
use krdiv_data::{FnGuideClient, KrxEtfSource, NaverMobileClient, SnapshotStore};

/// 모든 업스트림을 한 mockito 서버로 돌리는 갱신기 구성.
fn refresher(server: &mockito::ServerGuard, data_dir: &std::path::Path) -> UniverseRefresher {
    let config = CollectorConfig {
        data_dir: data_dir.to_path_buf(),
        ..CollectorConfig::default()
    };
    UniverseRefresher::with_sources(
        config,
        KrxEtfSource::with_base_url(server.url()),
        NaverMobileClient::with_base_url(server.url())
            .with_retry_backoff(Duration::from_millis(1)),
        FnGuideClient::with_base_url(server.url()),
    )
}

/// 오늘 기준 N일 전 날짜의 KRX 요청 본문 매처.
fn trd_dd_matcher(days_back: u64) -> mockito::Matcher {
    let date = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(days_back))
        .unwrap();
    mockito::Matcher::Regex(format!("trdDd={}", date.format("%Y%m%d")))
}

/// KRX 구간별 테이블 목업: 현재가와 1년 전만 데이터, 나머지 구간은 빈 응답.
async fn mock_krx_tables(server: &mut mockito::ServerGuard, now_body: &str, y1_body: &str) {
    server
        .mock("POST", "/")
        .match_body(trd_dd_matcher(0))
        .with_status(200)
        .with_body(now_body)
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(trd_dd_matcher(365))
        .with_status(200)
        .with_body(y1_body)
        .create_async()
        .await;
    for horizon in [Horizon::M1, Horizon::M3, Horizon::M6, Horizon::Y3, Horizon::Y5] {
        server
            .mock("POST", "/")
            .match_body(trd_dd_matcher(horizon.lookback_days() as u64))
            .with_status(200)
            .with_body(r#"{"output": []}"#)
            .create_async()
            .await;
    }
}

fn mock_directory(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/api/sise/etfItemList.nhn")
        .with_status(200)
        .with_body(body.to_string())
}

/// 네이버 시세가 전부 실패해도 KRX 테이블만으로 갱신이 완료되고,
/// 수익률/CAGR이 역산돼 스냅샷에 저장된다.
#[tokio::test]
async fn full_refresh_writes_snapshot_from_krx_only() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    mock_krx_tables(
        &mut server,
        r#"{"output": [{"ISU_SRT_CD": "069500", "TDD_CLSPRC": "100"}]}"#,
        r#"{"output": [{"ISU_SRT_CD": "069500", "TDD_CLSPRC": "80"}]}"#,
    )
    .await;
    mock_directory(
        &mut server,
        r#"{"result": {"etfItemList": [{"itemcode": "069500", "itemname": "KODEX 200"}]}}"#,
    )
    .create_async()
    .await;

    let refresher = refresher(&server, dir.path());
    let summary = refresher
        .run_refresh(
            Some(vec!["069500".to_string()]),
            &ProgressReporter::noop(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.total, 1);

    let snapshot = SnapshotStore::new(dir.path().join("dividend_universe.json"))
        .load()
        .unwrap();
    let record = &snapshot["069500"];
    assert_eq!(record.price, 100);
    assert_eq!(record.price_1y, 80);
    assert!((record.return_1y - 25.0).abs() < 1e-9);
    assert!((record.price_cagr_1y - 25.0).abs() < 1e-9);
    assert!(record.dist_warning);
    // 1년 외 구간은 시세 없음 → 전부 0
    assert_eq!(record.price_3y, 0);
    assert_eq!(record.return_3y, 0.0);
}

/// ETF 목록에 없는 종목은 유니버스에 들어오지 못한다.
#[tokio::test]
async fn non_etf_tickers_are_filtered_out() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    mock_krx_tables(
        &mut server,
        r#"{"output": [
            {"ISU_SRT_CD": "069500", "TDD_CLSPRC": "100"},
            {"ISU_SRT_CD": "005930", "TDD_CLSPRC": "70000"}
        ]}"#,
        r#"{"output": []}"#,
    )
    .await;
    // 005930(일반 주식)은 ETF 목록에 없다
    mock_directory(
        &mut server,
        r#"{"result": {"etfItemList": [{"itemcode": "069500", "itemname": "KODEX 200"}]}}"#,
    )
    .create_async()
    .await;

    let refresher = refresher(&server, dir.path());
    let summary = refresher
        .run_refresh(
            Some(vec!["069500".to_string(), "005930".to_string()]),
            &ProgressReporter::noop(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.total, 1);

    let snapshot = SnapshotStore::new(dir.path().join("dividend_universe.json"))
        .load()
        .unwrap();
    assert!(snapshot.contains_key("069500"));
    assert!(!snapshot.contains_key("005930"));
}

/// KRX 테이블에 없는 종목을 요청하면 유니버스가 낡았다는 신호로 보고
/// 목록 전체를 합쳐 갱신한다.
#[tokio::test]
async fn unknown_ticker_widens_to_full_universe() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    mock_krx_tables(
        &mut server,
        r#"{"output": [{"ISU_SRT_CD": "069500", "TDD_CLSPRC": "100"}]}"#,
        r#"{"output": []}"#,
    )
    .await;
    // 요청한 999999는 KRX 테이블에 없지만 신규 상장으로 목록에는 있다
    mock_directory(
        &mut server,
        r#"{"result": {"etfItemList": [
            {"itemcode": "069500", "itemname": "KODEX 200"},
            {"itemcode": "999999", "itemname": "신규상장 ETF"}
        ]}}"#,
    )
    .create_async()
    .await;

    let refresher = refresher(&server, dir.path());
    let summary = refresher
        .run_refresh(
            Some(vec!["999999".to_string()]),
            &ProgressReporter::noop(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    // 목록 전체가 합쳐져 요청하지 않은 069500도 함께 갱신된다
    assert_eq!(summary.total, 2);

    let snapshot = SnapshotStore::new(dir.path().join("dividend_universe.json"))
        .load()
        .unwrap();
    assert!(snapshot.contains_key("069500"));
    assert!(snapshot.contains_key("999999"));
    // KRX 시세가 없는 신규 종목은 가격 미상(0)으로 남는다
    assert_eq!(snapshot["999999"].price, 0);
}

/// 목록 조회에 실패하면 확정된 ETF가 없으므로 빈 결과로 끝난다.
#[tokio::test]
async fn discovery_failure_yields_empty_completed_run() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    mock_krx_tables(
        &mut server,
        r#"{"output": [{"ISU_SRT_CD": "069500", "TDD_CLSPRC": "100"}]}"#,
        r#"{"output": []}"#,
    )
    .await;
    // 디렉터리 엔드포인트 미등록: 목록 조회 실패

    let refresher = refresher(&server, dir.path());
    let summary = refresher
        .run_refresh(None, &ProgressReporter::noop(), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.total, 0);
    assert!(!dir.path().join("dividend_universe.json").exists());
}

/// 취소된 실행은 부분 결과를 스냅샷에 쓰지 않는다.
#[tokio::test]
async fn cancellation_leaves_snapshot_untouched() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    mock_krx_tables(
        &mut server,
        r#"{"output": [
            {"ISU_SRT_CD": "069500", "TDD_CLSPRC": "100"},
            {"ISU_SRT_CD": "458730", "TDD_CLSPRC": "200"},
            {"ISU_SRT_CD": "123456", "TDD_CLSPRC": "300"}
        ]}"#,
        r#"{"output": []}"#,
    )
    .await;
    mock_directory(
        &mut server,
        r#"{"result": {"etfItemList": [
            {"itemcode": "069500", "itemname": "A"},
            {"itemcode": "458730", "itemname": "B"},
            {"itemcode": "123456", "itemname": "C"}
        ]}}"#,
    )
    .create_async()
    .await;

    let refresher = refresher(&server, dir.path());

    // 첫 종목 완료 보고 시점에 취소
    let cancel = CancelToken::new();
    let cancel_from_progress = cancel.clone();
    let progress = ProgressReporter::new(move |message, _| {
        if message.starts_with("분배금 수집") {
            cancel_from_progress.cancel();
        }
    });

    let summary = refresher
        .run_refresh(None, &progress, &cancel)
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert!(summary.processed < summary.total || summary.total == 0);
    assert!(!dir.path().join("dividend_universe.json").exists());
}

/// 사전 취소된 실행은 KRX 조회 전에 끝난다.
#[tokio::test]
async fn pre_cancelled_run_returns_before_bulk_fetch() {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let refresher = refresher(&server, dir.path());
    let cancel = CancelToken::new();
    cancel.cancel();

    let summary = refresher
        .run_refresh(None, &ProgressReporter::noop(), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert_eq!(summary.processed, 0);
}

/// KRX 전체 실패 + 캐시 스냅샷 없음 → 실행 수준 실패, 스냅샷 미작성.
#[tokio::test]
async fn total_outage_without_snapshot_fails_run() {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    // KRX 엔드포인트 미등록: 모든 구간 조회 실패

    let refresher = refresher(&server, dir.path());

    let mut last_message = String::new();
    let messages = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&messages);
    let progress = ProgressReporter::new(move |message, _| {
        sink.lock().unwrap().push(message.to_string());
    });

    let summary = refresher
        .run_refresh(None, &progress, &CancelToken::new())
        .await
        .unwrap();

    if let Some(last) = messages.lock().unwrap().last() {
        last_message = last.clone();
    }

    assert_eq!(summary.status, RunStatus::Failed);
    assert!(last_message.contains("실패"));
    assert!(!dir.path().join("dividend_universe.json").exists());
}

/// KRX 전체 실패 시 마지막 스냅샷에서 시세 테이블을 재구성해 진행한다.
#[tokio::test]
async fn total_outage_with_snapshot_reconstructs_history() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    // 이전 실행이 남긴 스냅샷: price 100, return_1y 25% → 1년 전 80 역산
    let store = SnapshotStore::new(dir.path().join("dividend_universe.json"));
    let mut snapshot = krdiv_data::UniverseSnapshot::new();
    snapshot.insert(
        "069500".to_string(),
        krdiv_core::TickerRecord {
            name: "KODEX 200".to_string(),
            price: 100,
            return_1y: 25.0,
            ..Default::default()
        },
    );
    store.write_atomic(&snapshot).unwrap();

    // KRX 미등록(전체 실패), 디렉터리만 응답
    mock_directory(
        &mut server,
        r#"{"result": {"etfItemList": [{"itemcode": "069500", "itemname": "KODEX 200"}]}}"#,
    )
    .create_async()
    .await;

    let refresher = refresher(&server, dir.path());
    let summary = refresher
        .run_refresh(
            Some(vec!["069500".to_string()]),
            &ProgressReporter::noop(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.updated, 1);

    let record = &store.load().unwrap()["069500"];
    assert_eq!(record.price, 100);
    assert_eq!(record.price_1y, 80);
    assert!((record.return_1y - 25.0).abs() < 1e-9);
}

/// 빠른 시세 경로: ETF 시세 실패 시 일반 종목 시세로 폴백한다.
#[tokio::test]
async fn quotes_only_falls_back_to_stock_basic() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    server
        .mock("GET", "/api/etf/069500/basic")
        .with_status(200)
        .with_body(
            r#"{"result": {
                "stockName": "KODEX 200",
                "closePrice": "35,120",
                "compareToPreviousClosePrice": "120",
                "fluctuationsRatio": "0.34"
            }}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/etf/005935/basic")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/stock/005935/basic")
        .with_status(200)
        .with_body(
            r#"{
                "stockName": "삼성전자우",
                "closePrice": "60,000",
                "compareToPreviousClosePrice": "500",
                "fluctuationsRatio": "0.84",
                "compareToPreviousPrice": {"name": "FALLING"}
            }"#,
        )
        .create_async()
        .await;

    let refresher = refresher(&server, dir.path());
    let quotes = refresher
        .refresh_quotes_only(&["069500".to_string(), "005935".to_string()])
        .await;

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes["069500"].price, 35_120);
    assert_eq!(quotes["069500"].change_value, 120);
    assert_eq!(quotes["005935"].name, "삼성전자우");
    assert_eq!(quotes["005935"].price, 60_000);
    assert_eq!(quotes["005935"].change_value, -500);
    // 스냅샷은 건드리지 않는다
    assert!(!dir.path().join("dividend_universe.json").exists());
}
