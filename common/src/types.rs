//! 検知結果の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - Classification: ヘルメット着用判定
//! - DetectionResult: 1サイクル分の検知出力
//! - CameraFacing / PermissionStatus: カメラの状態

use serde::{Deserialize, Serialize};
use std::fmt;

/// 信頼度の下限（この値を含む）
pub const CONFIDENCE_MIN: u8 = 75;

/// 信頼度の上限（この値を含まない）
pub const CONFIDENCE_MAX: u8 = 100;

/// ヘルメット着用判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    /// ヘルメット着用
    Compliant,
    /// ヘルメット未着用
    NonCompliant,
}

/// 検知結果
///
/// 1サイクルにつき1つ生成され、状態に反映した後は破棄される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub classification: Classification,
    /// 信頼度 [75, 100)
    pub confidence_percent: u8,
}

impl DetectionResult {
    /// 信頼度を範囲内に丸めて生成
    pub fn new(classification: Classification, confidence_percent: u8) -> Self {
        Self {
            classification,
            confidence_percent: confidence_percent.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX - 1),
        }
    }
}

/// カメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
}

impl CameraFacing {
    /// 反対側の向き
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

impl std::str::FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" | "f" => Ok(CameraFacing::Front),
            "back" | "b" | "rear" => Ok(CameraFacing::Back),
            _ => Err(format!("Unknown facing: {}. Use front or back", s)),
        }
    }
}

/// カメラアクセス権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionStatus {
    /// 未確認（問い合わせ中）
    #[default]
    Undetermined,
    Denied,
    Granted,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}
