//! カメラ抽象
//!
//! 権限確認・撮影・向き切替を提供するカメラの境界。
//! 実機カメラの代わりに画像フォルダを再生する FolderCamera を同梱する。

mod folder;

pub use folder::FolderCamera;

use crate::error::Result;
use helmet_guard_common::{CameraFacing, PermissionStatus};
use std::path::{Path, PathBuf};

/// 撮影した静止画への参照（一時ファイル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    path: PathBuf,
}

impl SnapshotRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 撮影オプション
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// JPEG品質 (0.0-1.0)
    pub quality: f32,
    /// 向き補正などの後処理を省略
    pub skip_processing: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: 0.5,
            skip_processing: true,
        }
    }
}

impl CaptureOptions {
    /// JPEG エンコーダ用の品質 (1-100)
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// カメラ
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// 現在の権限状態
    fn permission_status(&self) -> PermissionStatus;

    /// 権限を要求（何度呼んでもよい）
    fn request_permission(&mut self) -> PermissionStatus;

    fn facing(&self) -> CameraFacing;

    fn set_facing(&mut self, facing: CameraFacing);

    /// 静止画を撮影して一時ファイルに保存
    async fn take_picture(&mut self, options: &CaptureOptions) -> Result<SnapshotRef>;

    /// カメラを解放（画面破棄時）
    fn release(&mut self) {}
}
