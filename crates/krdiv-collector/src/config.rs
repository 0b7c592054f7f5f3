//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터 디렉터리 (스냅샷/수동 이력 파일 위치)
    pub data_dir: PathBuf,
    /// 유니버스 갱신 설정
    pub refresh: RefreshConfig,
}

/// 유니버스 갱신 설정
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// 네이버 동시 요청 상한 (정합 파이프라인)
    pub max_concurrency: usize,
    /// 빠른 시세 갱신 경로의 동시 요청 상한
    pub quote_concurrency: usize,
    /// 일별 시세 이력 최대 페이지 수 (페이지당 20건, 약 1년 분)
    pub history_pages: u32,
    /// KRX 거래일 탐색 시 되짚는 최대 캘린더 일수
    pub krx_step_back_days: u32,
    /// 전체 갱신 모드로 전환하는 요청 종목 수 기준
    pub full_universe_threshold: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            quote_concurrency: 20,
            history_pages: 15,
            krx_step_back_days: 7,
            full_universe_threshold: 50,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = std::env::var("KRDIV_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Self {
            data_dir,
            refresh: RefreshConfig {
                max_concurrency: env_var_parse("KRDIV_MAX_CONCURRENCY", 10),
                quote_concurrency: env_var_parse("KRDIV_QUOTE_CONCURRENCY", 20),
                history_pages: env_var_parse("KRDIV_HISTORY_PAGES", 15),
                krx_step_back_days: env_var_parse("KRDIV_KRX_STEP_BACK_DAYS", 7),
                full_universe_threshold: env_var_parse("KRDIV_FULL_UNIVERSE_THRESHOLD", 50),
            },
        }
    }

    /// 스냅샷 파일 경로
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("dividend_universe.json")
    }

    /// 수동 분배금 이력 파일 경로
    pub fn manual_history_path(&self) -> PathBuf {
        self.data_dir.join("manual_dividend_history.json")
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            refresh: RefreshConfig::default(),
        }
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
