//! カラーパレット（ダークテーマ）

pub const PRIMARY: &str = "#00D9FF";

/// 着用（肯定）
pub const AFFIRMATIVE: &str = "#00FF94";
/// 未着用・高重要度
pub const ALERT: &str = "#FF3B5C";
/// 中重要度・未対応
pub const WARNING: &str = "#FFA726";
/// 低重要度・対応済み
pub const SUCCESS: &str = "#66BB6A";
/// 中立
pub const NEUTRAL: &str = PRIMARY;
