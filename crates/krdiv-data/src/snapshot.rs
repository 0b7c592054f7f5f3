//! 유니버스 스냅샷 저장소.
//!
//! 스냅샷 파일(`dividend_universe.json`)은 종목코드 → 레코드 매핑의
//! 단일 JSON 객체이며, 이 모듈이 유일한 쓰기 주체입니다. 쓰기는 같은
//! 디렉터리에 임시 파일을 만든 뒤 rename하는 원자적 방식이라 읽는 쪽이
//! 잘린 파일을 보는 일이 없습니다.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use krdiv_core::{HorizonCloses, TickerRecord};

use crate::error::{DataError, Result};

/// 종목코드 → 레코드 매핑. 직렬화 시 키 순서가 안정되도록 BTreeMap.
pub type UniverseSnapshot = BTreeMap<String, TickerRecord>;

/// 스냅샷 파일 저장소.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// 스냅샷 파일 경로로 저장소 생성.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 스냅샷 파일 경로.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 스냅샷 로드 (엄격).
    ///
    /// 파일이 없으면 `SnapshotMissing`, 파싱 실패는 그대로 전파합니다.
    /// 폴백 재구성처럼 "이전 스냅샷이 정말 있는지"가 중요한 경로에서
    /// 사용합니다.
    pub fn load(&self) -> Result<UniverseSnapshot> {
        if !self.path.exists() {
            return Err(DataError::SnapshotMissing(
                self.path.display().to_string(),
            ));
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 스냅샷 로드 (관대).
    ///
    /// 없거나 읽을 수 없으면 빈 스냅샷으로 취급합니다. 병합 전 기존
    /// 데이터를 불러오는 경로에서 사용합니다.
    pub fn load_lenient(&self) -> UniverseSnapshot {
        match self.load() {
            Ok(snapshot) => snapshot,
            Err(DataError::SnapshotMissing(_)) => UniverseSnapshot::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "스냅샷 로드 실패, 빈 스냅샷으로 진행");
                UniverseSnapshot::new()
            }
        }
    }

    /// 스냅샷 원자적 쓰기 (임시 파일 작성 후 rename).
    pub fn write_atomic(&self, snapshot: &UniverseSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(snapshot)?;
        fs::write(&tmp_path, text)?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            // rename 실패 시 임시 파일 정리
            let _ = fs::remove_file(&tmp_path);
            DataError::IoError(e)
        })?;

        debug!(path = %self.path.display(), tickers = snapshot.len(), "스냅샷 저장 완료");
        Ok(())
    }

    /// 신규 레코드를 기존 스냅샷 위에 증분 병합해 저장.
    ///
    /// 이번 실행에서 갱신되지 않은 기존 종목은 그대로 남습니다.
    /// 저장된 전체 종목 수를 돌려줍니다.
    pub fn merge_write(&self, updates: HashMap<String, TickerRecord>) -> Result<usize> {
        let mut snapshot = self.load_lenient();
        let updated = updates.len();
        snapshot.extend(updates);
        self.write_atomic(&snapshot)?;

        info!(
            path = %self.path.display(),
            updated,
            total = snapshot.len(),
            "스냅샷 병합 저장"
        );
        Ok(snapshot.len())
    }

    /// 마지막 스냅샷에서 구간별 종가 테이블을 역산해 재구성.
    ///
    /// KRX 전체 조회가 완전히 실패했을 때의 폴백입니다. 스냅샷이 없으면
    /// `SnapshotMissing`을 그대로 돌려주어 실행 수준 실패로 이어집니다.
    pub fn synthetic_close_tables(&self) -> Result<HashMap<String, HorizonCloses>> {
        let snapshot = self.load()?;

        let tables: HashMap<String, HorizonCloses> = snapshot
            .iter()
            .map(|(ticker, record)| (ticker.clone(), record.synthetic_closes()))
            .collect();

        info!(
            path = %self.path.display(),
            tickers = tables.len(),
            "캐시된 스냅샷으로 시세 테이블 재구성"
        );
        Ok(tables)
    }
}
