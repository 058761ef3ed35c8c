//! 一時スナップショットの読み込み・削除

use crate::camera::SnapshotRef;
use crate::error::{HelmetGuardError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// 撮影ごとの一時ファイルを扱うストア
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotStore;

impl SnapshotStore {
    pub fn new() -> Self {
        Self
    }

    /// Base64 文字列として読み込む
    pub async fn read_base64(&self, snapshot: &SnapshotRef) -> Result<String> {
        let bytes = tokio::fs::read(snapshot.path()).await.map_err(|e| {
            HelmetGuardError::AnalysisFailure(format!("{}: {}", snapshot.path().display(), e))
        })?;
        Ok(STANDARD.encode(bytes))
    }

    /// 存在すれば削除する。既に無い場合は成功扱い
    pub async fn delete(&self, snapshot: &SnapshotRef) -> Result<()> {
        match tokio::fs::remove_file(snapshot.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
