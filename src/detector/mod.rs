//! ヘルメット検知
//!
//! 画像 → 判定結果 の境界。現在は乱数スタブのみで、
//! 実際の画像分類モデルはこのトレイトを実装して差し替える。

mod random;

pub use random::{classify_draw, RandomDetector};

use crate::camera::SnapshotRef;
use crate::error::Result;
use helmet_guard_common::DetectionResult;

/// 検知器
#[allow(async_fn_in_trait)]
pub trait Detector {
    async fn detect(&mut self, snapshot: &SnapshotRef) -> Result<DetectionResult>;
}
