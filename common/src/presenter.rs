//! ステータス表示の導出
//!
//! ループ状態から表示色・記号を決める純粋関数。
//! ステータス文字列の部分一致ではなく、判定タグから直接マッピングする。

use crate::state::{LoopState, StatusMessage};
use crate::theme;
use crate::types::Classification;
use serde::Serialize;

/// 表示用の判定タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Indication {
    Compliant,
    NonCompliant,
    Unknown,
}

impl Indication {
    pub fn from_status(status: StatusMessage) -> Self {
        match status {
            StatusMessage::Detected(Classification::Compliant) => Indication::Compliant,
            StatusMessage::Detected(Classification::NonCompliant) => Indication::NonCompliant,
            _ => Indication::Unknown,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Indication::Compliant => theme::AFFIRMATIVE,
            Indication::NonCompliant => theme::ALERT,
            Indication::Unknown => theme::NEUTRAL,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Indication::Compliant => '✓',
            Indication::NonCompliant => '✕',
            Indication::Unknown => '◉',
        }
    }
}

/// 信頼度とスキャン数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub confidence_percent: u8,
    pub scans: u64,
}

/// ステータスカード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub indication: Indication,
    pub color: &'static str,
    pub symbol: char,
    pub text: String,
    /// LIVE表示
    pub live: bool,
    /// 結果が出るまでは None
    pub stats: Option<StatsView>,
}

/// ループ状態からステータスカードを導出
pub fn present(state: &LoopState) -> StatusView {
    let indication = Indication::from_status(state.status());
    let stats = state.last_result().map(|result| StatsView {
        confidence_percent: result.confidence_percent,
        scans: state.cycle_count(),
    });

    StatusView {
        indication,
        color: indication.color(),
        symbol: indication.symbol(),
        text: state.status().to_string(),
        live: state.is_running(),
        stats,
    }
}
