//! Helmet Guard Common Library
//!
//! CLIと将来のフロントエンドで共有される型とユーティリティ

pub mod types;
pub mod state;
pub mod presenter;
pub mod records;
pub mod theme;
pub mod error;
pub mod export;

pub use types::{
    CameraFacing, Classification, DetectionResult, PermissionStatus, CONFIDENCE_MAX, CONFIDENCE_MIN,
};
pub use state::{Generation, LoopState, StatusMessage};
pub use presenter::{present, Indication, StatsView, StatusView};
pub use records::{
    filter_violations, sample_alerts, sample_violation_stats, sample_violations, Alert, Severity,
    Violation, ViolationFilter, ViolationStat, ViolationStatus,
};
pub use error::{Error, Result};
