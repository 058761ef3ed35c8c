//! カメラ権限ゲート
//!
//! 権限が得られるまで撮影・検知の操作を受け付けない。
//! 拒否された場合は自動で再要求せず、明示的な要求操作を待つ。

use crate::camera::Camera;
use helmet_guard_common::PermissionStatus;

/// ゲートの表示状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// 権限確認中（"Initializing Camera..."）
    Loading,
    /// 説明と許可ボタン（"Camera Access Required"）
    Denied,
    /// カメラ映像と操作を表示
    Granted,
}

impl From<PermissionStatus> for GateView {
    fn from(status: PermissionStatus) -> Self {
        match status {
            PermissionStatus::Undetermined => GateView::Loading,
            PermissionStatus::Denied => GateView::Denied,
            PermissionStatus::Granted => GateView::Granted,
        }
    }
}

/// 起動時の権限判定の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub view: GateView,
    /// 設定に保存する回答。利用者が実際に答えたときだけ Some
    pub remember: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    status: PermissionStatus,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> GateView {
        self.status.into()
    }

    pub fn is_open(&self) -> bool {
        self.status.is_granted()
    }

    /// マウント時の権限問い合わせ
    pub fn check<C: Camera>(&mut self, camera: &C) -> GateView {
        self.status = camera.permission_status();
        self.view()
    }

    /// 権限を要求（拒否されても何度でも呼べる）
    pub fn request<C: Camera>(&mut self, camera: &mut C) -> GateView {
        self.status = camera.request_permission();
        log::info!("camera permission: {:?}", self.status);
        self.view()
    }

    /// 実行中に権限が失われた
    pub fn revoke(&mut self) {
        self.status = PermissionStatus::Denied;
    }
}
