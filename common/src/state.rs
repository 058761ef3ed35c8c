//! 検知ループの状態
//!
//! 状態遷移:
//! - Idle → start() → Running（カウンタを0に戻し、世代を進める）
//! - Running → stop() → Idle（最後の結果とカウンタは残す）
//!
//! 各サイクルは開始時の世代番号を持ち、コミット時に照合する。
//! 停止・再開後に遅れて届いた結果は破棄される。

use crate::types::{Classification, DetectionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ステータス表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusMessage {
    #[default]
    Idle,
    Scanning,
    Detected(Classification),
    Retrying,
    Stopped,
    AccessRevoked,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusMessage::Idle => "Press Start to Begin",
            StatusMessage::Scanning => "Scanning...",
            StatusMessage::Detected(Classification::Compliant) => "Helmet Detected",
            StatusMessage::Detected(Classification::NonCompliant) => "No Helmet - Please Wear One!",
            StatusMessage::Retrying => "Detection Error - Retrying...",
            StatusMessage::Stopped => "Detection Stopped",
            StatusMessage::AccessRevoked => "Camera Access Revoked",
        };
        f.write_str(text)
    }
}

/// 世代番号（サイクル開始時に取得し、コミット時に照合）
pub type Generation = u64;

/// ループ状態
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    running: bool,
    cycle_count: u64,
    last_result: Option<DetectionResult>,
    status: StatusMessage,
    generation: Generation,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 成功したサイクル数
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn last_result(&self) -> Option<&DetectionResult> {
        self.last_result.as_ref()
    }

    pub fn status(&self) -> StatusMessage {
        self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// 検知開始。既に実行中なら何もしない（false を返す）
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.generation += 1;
        self.running = true;
        self.cycle_count = 0;
        self.last_result = None;
        self.status = StatusMessage::Scanning;
        true
    }

    /// 検知停止。停止中なら何もしない（false を返す）
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.halt(StatusMessage::Stopped);
        true
    }

    /// カメラ権限の取り消しによる強制停止
    pub fn revoke(&mut self) {
        self.halt(StatusMessage::AccessRevoked);
    }

    fn halt(&mut self, status: StatusMessage) {
        // 世代を進めて実行中サイクルの結果を無効化
        self.generation += 1;
        self.running = false;
        self.status = status;
    }

    /// 指定世代のサイクルがまだ有効か
    pub fn accepts(&self, generation: Generation) -> bool {
        self.running && self.generation == generation
    }

    /// 検知結果を反映。世代が古ければ破棄して false を返す
    pub fn commit_result(&mut self, generation: Generation, result: DetectionResult) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.cycle_count += 1;
        self.last_result = Some(result);
        self.status = StatusMessage::Detected(result.classification);
        true
    }

    /// 失敗を反映（一時的な再試行表示）。カウンタは進めない
    pub fn commit_failure(&mut self, generation: Generation) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.status = StatusMessage::Retrying;
        true
    }
}
