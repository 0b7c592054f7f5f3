//! Standalone universe collector CLI.

use clap::{Parser, Subcommand};
use krdiv_collector::{
    CancelToken, CollectorConfig, ProgressReporter, RunStatus, UniverseRefresher,
};
use krdiv_core::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "krdiv-collector")]
#[command(about = "KR ETF Dividend Universe Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 유니버스 전체/대상 갱신 (스냅샷 병합 저장)
    Refresh {
        /// 특정 종목만 갱신 (쉼표로 구분, 예: "069500,458730")
        #[arg(long)]
        tickers: Option<String>,
    },

    /// 빠른 시세 조회 (스냅샷 미변경, JSON 출력)
    Quotes {
        /// 조회할 종목 (쉼표로 구분)
        #[arg(long)]
        tickers: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화 (RUST_LOG가 있으면 그쪽이 우선)
    let log_config = LogConfig {
        level: cli.log_level.clone(),
        ..LogConfig::from_env()
    };
    init_logging(log_config)?;

    tracing::info!("KrDiv Collector 시작");

    let config = CollectorConfig::from_env();
    tracing::debug!(data_dir = %config.data_dir.display(), "설정 로드 완료");

    let refresher = UniverseRefresher::new(config);

    match cli.command {
        Commands::Refresh { tickers } => {
            let targets = tickers.as_deref().map(parse_ticker_list);

            let cancel = CancelToken::new();
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("종료 신호 수신, 진행 중인 갱신을 중단합니다");
                    signal_token.cancel();
                }
            });

            let progress =
                ProgressReporter::new(|message, percent| {
                    tracing::info!(percent, "{}", message);
                });

            let summary = refresher.run_refresh(targets, &progress, &cancel).await?;
            tracing::info!(
                status = ?summary.status,
                updated = summary.updated,
                processed = summary.processed,
                total = summary.total,
                "{}",
                summary.message
            );

            if summary.status == RunStatus::Failed {
                std::process::exit(1);
            }
        }
        Commands::Quotes { tickers } => {
            let list = parse_ticker_list(&tickers);
            let quotes = refresher.refresh_quotes_only(&list).await;
            println!("{}", serde_json::to_string_pretty(&quotes)?);
        }
    }

    tracing::info!("KrDiv Collector 종료");
    Ok(())
}

/// 쉼표로 구분된 종목코드 파싱.
fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
