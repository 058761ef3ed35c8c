use crate::error::{HelmetGuardError, Result};
use helmet_guard_common::CameraFacing;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 検知間隔（ミリ秒）
    pub interval_ms: u64,
    /// 撮影品質 (0.0-1.0)
    pub capture_quality: f32,
    /// 解析待ち時間（ミリ秒）
    pub analysis_delay_ms: u64,
    /// この値以下の乱数で未着用と判定
    pub non_compliant_threshold: f64,
    /// 1280px を超えるフレームを縮小してから保存
    pub resize_snapshots: bool,
    /// 一時スナップショットの保存先（省略時はシステムの一時フォルダ）
    pub snapshot_dir: Option<PathBuf>,
    pub default_facing: CameraFacing,
    /// カメラ利用の同意（None は未確認）
    pub camera_access: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            capture_quality: 0.5,
            analysis_delay_ms: 300,
            non_compliant_threshold: 0.4,
            resize_snapshots: false,
            snapshot_dir: None,
            default_facing: CameraFacing::Back,
            camera_access: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| HelmetGuardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("helmet-guard").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(HelmetGuardError::Config("interval_ms は1以上を指定してください".into()));
        }
        if !(self.capture_quality > 0.0 && self.capture_quality <= 1.0) {
            return Err(HelmetGuardError::Config(format!(
                "capture_quality は 0.0 より大きく 1.0 以下: {}",
                self.capture_quality
            )));
        }
        if !(0.0..=1.0).contains(&self.non_compliant_threshold) {
            return Err(HelmetGuardError::Config(format!(
                "non_compliant_threshold は 0.0-1.0: {}",
                self.non_compliant_threshold
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("helmet-guard-snapshots"))
    }

    /// 同意状態を保存
    pub fn set_camera_access(&mut self, granted: Option<bool>) -> Result<()> {
        self.camera_access = granted;
        self.save()
    }
}
