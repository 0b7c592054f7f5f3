//! 진행 상황 보고와 협조적 취소.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 진행 상황 콜백: (메시지, 0~100 퍼센트).
pub type ProgressFn = dyn Fn(&str, u8) + Send + Sync;

/// 진행 상황 보고자.
///
/// 오케스트레이터가 단계 전환과 종목별 완료마다 동기적으로 호출합니다.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Arc<ProgressFn>,
}

impl ProgressReporter {
    /// 콜백으로 보고자 생성.
    pub fn new(callback: impl Fn(&str, u8) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// 아무것도 하지 않는 보고자.
    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    /// 진행 상황 보고.
    pub fn report(&self, message: &str, percent: u8) {
        (self.callback)(message, percent.min(100));
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

/// 협조적 취소 신호.
///
/// 전체 시세 조회 전과 종목별 작업 완료 시점에만 확인하므로, 이미
/// 날아간 HTTP 요청을 강제로 끊지는 않습니다.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 새 취소 토큰 생성 (해제 상태).
    pub fn new() -> Self {
        Self::default()
    }

    /// 취소 요청.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 취소 상태 해제 (토큰 재사용).
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// 취소 여부 확인.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
