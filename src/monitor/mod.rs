//! 撮影・検知ループ
//!
//! 権限ゲート → 撮影 → 検知 → 表示 の一連を管理する。

mod capture;
mod gate;
mod session;

pub use capture::{CycleOutcome, Monitor};
pub use gate::{Admission, GateView, PermissionGate};
pub use session::{run_session, Command, SessionOptions, Updates};
