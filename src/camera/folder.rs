//! フォルダ再生カメラ
//!
//! 指定フォルダの画像をファイル名順に繰り返し「撮影」する。
//! 撮影のたびに JPEG へ再エンコードした一時ファイルを作る。

use super::{Camera, CaptureOptions, SnapshotRef};
use crate::error::{HelmetGuardError, Result};
use helmet_guard_common::{CameraFacing, PermissionStatus};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// 後処理ありの場合の最大辺
const MAX_SNAPSHOT_EDGE: u32 = 1280;

pub struct FolderCamera {
    frames: Vec<PathBuf>,
    cursor: usize,
    snapshot_dir: PathBuf,
    sequence: u64,
    facing: CameraFacing,
    permission: PermissionStatus,
    consent: Box<dyn FnMut() -> Option<bool> + Send>,
}

impl FolderCamera {
    /// 画像フォルダを開く
    pub fn open(source: &Path, snapshot_dir: impl Into<PathBuf>) -> Result<Self> {
        let frames = scan_frames(source)?;
        if frames.is_empty() {
            return Err(HelmetGuardError::NoImagesFound(source.display().to_string()));
        }

        Ok(Self {
            frames,
            cursor: 0,
            snapshot_dir: snapshot_dir.into(),
            sequence: 0,
            facing: CameraFacing::default(),
            permission: PermissionStatus::Undetermined,
            consent: Box::new(|| None),
        })
    }

    /// 既知の権限状態を設定
    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// 権限要求時に呼ばれる同意確認
    ///
    /// `None` は回答が得られなかったことを表し、権限は未確認のまま残る。
    pub fn with_consent<F>(mut self, consent: F) -> Self
    where
        F: FnMut() -> Option<bool> + Send + 'static,
    {
        self.consent = Box::new(consent);
        self
    }

    pub fn with_facing(mut self, facing: CameraFacing) -> Self {
        self.facing = facing;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn next_frame(&mut self) -> PathBuf {
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        frame
    }
}

impl Camera for FolderCamera {
    fn permission_status(&self) -> PermissionStatus {
        self.permission
    }

    fn request_permission(&mut self) -> PermissionStatus {
        if !self.permission.is_granted() {
            match (self.consent)() {
                Some(true) => self.permission = PermissionStatus::Granted,
                Some(false) => self.permission = PermissionStatus::Denied,
                None => log::warn!("camera consent not answered"),
            }
        }
        self.permission
    }

    fn facing(&self) -> CameraFacing {
        self.facing
    }

    fn set_facing(&mut self, facing: CameraFacing) {
        self.facing = facing;
    }

    async fn take_picture(&mut self, options: &CaptureOptions) -> Result<SnapshotRef> {
        if !self.permission.is_granted() {
            return Err(HelmetGuardError::PermissionDenied);
        }

        let source = self.next_frame();
        self.sequence += 1;
        // 同じ保存先を使う別プロセスと衝突しないようPIDを含める
        let dest = self.snapshot_dir.join(format!(
            "snapshot-{}-{:06}.jpg",
            std::process::id(),
            self.sequence
        ));

        tokio::fs::create_dir_all(&self.snapshot_dir).await.map_err(|e| {
            HelmetGuardError::CaptureFailure(format!("{}: {}", self.snapshot_dir.display(), e))
        })?;

        let mirror = self.facing == CameraFacing::Front;
        let resize = !options.skip_processing;
        let quality = options.jpeg_quality();
        let out = dest.clone();

        tokio::task::spawn_blocking(move || encode_snapshot(&source, &out, mirror, resize, quality))
            .await
            .map_err(|e| HelmetGuardError::CaptureFailure(format!("撮影タスク異常終了: {}", e)))??;

        log::debug!("snapshot written: {}", dest.display());
        Ok(SnapshotRef::new(dest))
    }

    fn release(&mut self) {
        log::info!("camera released ({} frames)", self.frames.len());
        self.cursor = 0;
    }
}

/// フォルダ直下の画像をファイル名順に列挙
fn scan_frames(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(HelmetGuardError::FolderNotFound(folder.display().to_string()));
    }

    let mut frames: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

/// 画像を読み込み JPEG で書き出す
fn encode_snapshot(source: &Path, dest: &Path, mirror: bool, resize: bool, quality: u8) -> Result<()> {
    let capture_err = |e: &dyn std::fmt::Display| {
        HelmetGuardError::CaptureFailure(format!("{}: {}", source.display(), e))
    };

    let mut img = image::open(source).map_err(|e| capture_err(&e))?;

    if mirror {
        img = img.fliph();
    }
    if resize && (img.width() > MAX_SNAPSHOT_EDGE || img.height() > MAX_SNAPSHOT_EDGE) {
        img = img.thumbnail(MAX_SNAPSHOT_EDGE, MAX_SNAPSHOT_EDGE);
    }

    // JPEG は RGBA を受け付けない
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let file = File::create(dest).map_err(|e| capture_err(&e))?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    if let Err(e) = rgb.write_with_encoder(encoder) {
        // 書きかけのファイルは参照が返らないのでここで消す
        if let Err(rm) = std::fs::remove_file(dest) {
            log::warn!("partial snapshot not removed: {}: {}", dest.display(), rm);
        }
        return Err(capture_err(&e));
    }

    Ok(())
}
