//! アラート・違反記録
//!
//! 画面表示用の読み取り専用サンプルデータと、違反一覧のステータス絞り込み。

use crate::theme;
use serde::{Deserialize, Serialize};
use std::fmt;

/// アラート重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn color(&self) -> &'static str {
        match self {
            Severity::High => theme::ALERT,
            Severity::Medium => theme::WARNING,
            Severity::Low => theme::SUCCESS,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// ライブアラート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub time: String,
    pub severity: Severity,
    pub camera: String,
}

/// 違反の対応状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStatus {
    Pending,
    Resolved,
}

impl ViolationStatus {
    pub fn color(&self) -> &'static str {
        match self {
            ViolationStatus::Pending => theme::WARNING,
            ViolationStatus::Resolved => theme::SUCCESS,
        }
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationStatus::Pending => write!(f, "pending"),
            ViolationStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// 違反記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub worker: String,
    pub status: ViolationStatus,
}

/// 違反一覧の絞り込みキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationFilter {
    #[default]
    All,
    Pending,
    Resolved,
}

impl ViolationFilter {
    /// 画面に並べる順序
    pub const KEYS: [ViolationFilter; 3] = [
        ViolationFilter::All,
        ViolationFilter::Pending,
        ViolationFilter::Resolved,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViolationFilter::All => "All",
            ViolationFilter::Pending => "Pending",
            ViolationFilter::Resolved => "Resolved",
        }
    }

    pub fn matches(&self, violation: &Violation) -> bool {
        match self {
            ViolationFilter::All => true,
            ViolationFilter::Pending => violation.status == ViolationStatus::Pending,
            ViolationFilter::Resolved => violation.status == ViolationStatus::Resolved,
        }
    }
}

impl std::str::FromStr for ViolationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ViolationFilter::All),
            "pending" => Ok(ViolationFilter::Pending),
            "resolved" => Ok(ViolationFilter::Resolved),
            _ => Err(format!("Unknown filter: {}. Use all, pending, or resolved", s)),
        }
    }
}

/// 違反一覧を絞り込む（元の順序を保持）
pub fn filter_violations(violations: &[Violation], filter: ViolationFilter) -> Vec<&Violation> {
    violations.iter().filter(|v| filter.matches(v)).collect()
}

/// 違反画面上部の集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationStat {
    pub label: String,
    pub value: u32,
}

fn alert(id: u32, kind: &str, location: &str, time: &str, severity: Severity, camera: &str) -> Alert {
    Alert {
        id,
        kind: kind.to_string(),
        location: location.to_string(),
        time: time.to_string(),
        severity,
        camera: camera.to_string(),
    }
}

fn violation(
    id: u32,
    kind: &str,
    location: &str,
    date: &str,
    time: &str,
    worker: &str,
    status: ViolationStatus,
) -> Violation {
    Violation {
        id,
        kind: kind.to_string(),
        location: location.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        worker: worker.to_string(),
        status,
    }
}

/// ライブアラートのサンプル
pub fn sample_alerts() -> Vec<Alert> {
    vec![
        alert(1, "No Helmet", "Gate A - Entrance", "2 mins ago", Severity::High, "CAM-01"),
        alert(2, "No Helmet", "Production Floor B", "5 mins ago", Severity::High, "CAM-04"),
        alert(3, "Suspicious Activity", "Parking Lot", "12 mins ago", Severity::Medium, "CAM-08"),
    ]
}

/// 違反記録のサンプル
pub fn sample_violations() -> Vec<Violation> {
    use ViolationStatus::{Pending, Resolved};

    vec![
        violation(1, "No Helmet", "Gate A", "2025-09-29", "14:30", "John Doe", Pending),
        violation(2, "No Helmet", "Floor B", "2025-09-29", "13:15", "Jane Smith", Resolved),
        violation(3, "No Helmet", "Warehouse", "2025-09-28", "16:45", "Mike Johnson", Pending),
        violation(4, "Safety Violation", "Production", "2025-09-28", "11:20", "Sarah Wilson", Resolved),
    ]
}

/// 違反集計のサンプル
pub fn sample_violation_stats() -> Vec<ViolationStat> {
    [("Today", 12), ("This Week", 47), ("Pending", 8)]
        .into_iter()
        .map(|(label, value)| ViolationStat { label: label.to_string(), value })
        .collect()
}
