//! 乱数による検知スタブ
//!
//! 画像を読み込んで一定時間待った後、一様乱数1回で判定と信頼度を決める。
//! 画像の中身は見ていない。

use super::Detector;
use crate::camera::SnapshotRef;
use crate::error::Result;
use crate::store::SnapshotStore;
use helmet_guard_common::{Classification, DetectionResult, CONFIDENCE_MIN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// 乱数値から判定結果を作る
///
/// - `draw <= threshold` → 未着用
/// - 信頼度 = floor(draw * 25) + 75
pub fn classify_draw(draw: f64, threshold: f64) -> DetectionResult {
    let classification = if draw <= threshold {
        Classification::NonCompliant
    } else {
        Classification::Compliant
    };
    let confidence = (draw.clamp(0.0, 1.0) * 25.0).floor() as u8 + CONFIDENCE_MIN;
    DetectionResult::new(classification, confidence)
}

pub struct RandomDetector {
    store: SnapshotStore,
    delay: Duration,
    threshold: f64,
    rng: StdRng,
}

impl RandomDetector {
    pub fn new(store: SnapshotStore, delay: Duration, threshold: f64) -> Self {
        Self {
            store,
            delay,
            threshold,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// 再現可能な乱数列を使う
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Detector for RandomDetector {
    async fn detect(&mut self, snapshot: &SnapshotRef) -> Result<DetectionResult> {
        let encoded = self.store.read_base64(snapshot).await?;
        log::debug!("analyzing {} ({} bytes base64)", snapshot.path().display(), encoded.len());

        tokio::time::sleep(self.delay).await;

        let draw: f64 = self.rng.random();
        Ok(classify_draw(draw, self.threshold))
    }
}
