//! 갱신 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 유니버스 갱신 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshStats {
    /// 총 처리 대상 종목 수
    pub total: usize,
    /// 레코드 생성 성공 수
    pub success: usize,
    /// 건너뛴 수 (ETF 목록에 없는 종목)
    pub skipped: usize,
    /// 레코드 생성 실패 수 (종목 단위로 흡수된 오류)
    pub errors: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            skipped = self.skipped,
            errors = self.errors,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 완료"
        );
    }
}
