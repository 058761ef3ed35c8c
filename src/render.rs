//! 画面のテキスト描画
//!
//! 各画面を端末向けの文字列に変換する。色は表示名の後ろに16進で添える。

use crate::monitor::GateView;
use helmet_guard_common::{
    Alert, CameraFacing, StatusView, Violation, ViolationFilter, ViolationStat,
};
use std::fmt::Write;

/// 権限ゲート
pub fn render_gate(view: GateView) -> String {
    match view {
        GateView::Loading => "⏳ Initializing Camera...".to_string(),
        GateView::Denied => [
            "📷 Camera Access Required",
            "   We need camera permission to detect helmets and ensure safety compliance",
        ]
        .join("\n"),
        GateView::Granted => "✔ Camera ready".to_string(),
    }
}

/// ステータスカード
pub fn render_status(view: &StatusView, facing: Option<CameraFacing>) -> String {
    let mut out = String::new();

    let _ = write!(out, "HELMET DETECTOR");
    if view.live {
        let _ = write!(out, "  ● LIVE");
    }
    if let Some(facing) = facing {
        let _ = write!(out, "  [camera: {}]", facing);
    }
    let _ = writeln!(out);
    let _ = write!(out, "[{}] Status: {} ({})", view.symbol, view.text, view.color);

    if let Some(stats) = view.stats {
        let _ = write!(
            out,
            "\n    Confidence: {}%  |  Scans: {}",
            stats.confidence_percent, stats.scans
        );
    }
    out
}

/// ライブアラート一覧
pub fn render_alerts(alerts: &[Alert]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🔔 Live Alerts ({})", alerts.len());

    for alert in alerts {
        let _ = writeln!(out, "---");
        let _ = writeln!(
            out,
            "  {} [{} {}]",
            alert.kind,
            alert.severity,
            alert.severity.color()
        );
        let _ = writeln!(out, "  📍 {}", alert.location);
        let _ = writeln!(out, "  📹 {}  🕒 {}", alert.camera, alert.time);
    }
    out
}

/// 違反一覧（集計・絞り込み付き）
pub fn render_violations(
    stats: &[ViolationStat],
    violations: &[&Violation],
    filter: ViolationFilter,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🛡 Violations");

    let summary: Vec<String> = stats
        .iter()
        .map(|s| format!("{}: {}", s.label, s.value))
        .collect();
    let _ = writeln!(out, "  {}", summary.join("  |  "));

    let chips: Vec<String> = ViolationFilter::KEYS
        .iter()
        .map(|key| {
            if *key == filter {
                format!("[{}]", key.label())
            } else {
                key.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "  Filter: {}", chips.join(" "));
    let _ = writeln!(out, "Recent Reports");

    if violations.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for v in violations {
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "  {} - {} [{} {}]", v.kind, v.worker, v.status, v.status.color());
        let _ = writeln!(out, "  📍 {}  📅 {}  🕒 {}", v.location, v.date, v.time);
    }
    out
}
