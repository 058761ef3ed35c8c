//! 撮影・検知画面
//!
//! カメラハンドルを明示的に所有し、マウントで取得・アンマウントで解放する。
//! 1サイクル = 撮影 → 検知 → 一時ファイル削除 → 状態反映。

use super::gate::{Admission, GateView, PermissionGate};
use crate::camera::{Camera, CaptureOptions};
use crate::detector::Detector;
use crate::store::SnapshotStore;
use helmet_guard_common::{CameraFacing, DetectionResult, LoopState};

/// 1サイクルの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 停止中またはカメラ未取得
    Skipped,
    Detected(DetectionResult),
    /// 撮影・解析の失敗（次のティックで再試行）
    Failed,
    /// 権限喪失による強制停止
    Revoked,
    /// 停止・再開により結果が古くなった
    Discarded,
}

pub struct Monitor<C, D> {
    camera: Option<C>,
    detector: D,
    store: SnapshotStore,
    options: CaptureOptions,
    gate: PermissionGate,
    state: LoopState,
}

impl<C: Camera, D: Detector> Monitor<C, D> {
    pub fn new(detector: D, store: SnapshotStore, options: CaptureOptions) -> Self {
        Self {
            camera: None,
            detector,
            store,
            options,
            gate: PermissionGate::new(),
            state: LoopState::new(),
        }
    }

    /// カメラを取得して権限を確認
    pub fn mount(&mut self, camera: C) -> GateView {
        let view = self.gate.check(&camera);
        self.camera = Some(camera);
        view
    }

    /// 検知を止めてカメラを解放
    pub fn unmount(&mut self) -> Option<C> {
        self.state.stop();
        let mut camera = self.camera.take()?;
        camera.release();
        Some(camera)
    }

    pub fn is_mounted(&self) -> bool {
        self.camera.is_some()
    }

    pub fn gate(&self) -> GateView {
        self.gate.view()
    }

    /// 権限要求。カメラ未取得なら現在の表示を返す
    pub fn request_permission(&mut self) -> GateView {
        match self.camera.as_mut() {
            Some(camera) => self.gate.request(camera),
            None => self.gate.view(),
        }
    }

    /// 起動時の権限判定
    ///
    /// 保存済みの拒否は `assume_yes` なしでは再確認しない。
    /// `assume_yes` による許可はその場限りで、保存対象にしない。
    pub fn admit(&mut self, stored: Option<bool>, assume_yes: bool) -> Admission {
        let view = self.gate.view();
        if view == GateView::Granted {
            return Admission { view, remember: None };
        }
        if stored == Some(false) && !assume_yes {
            log::info!("camera access denied in config; not asking again");
            return Admission { view: GateView::Denied, remember: None };
        }

        let view = self.request_permission();
        let remember = match view {
            _ if assume_yes => None,
            GateView::Granted => Some(true),
            GateView::Denied => Some(false),
            GateView::Loading => None,
        };
        Admission { view, remember }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn facing(&self) -> Option<CameraFacing> {
        self.camera.as_ref().map(|c| c.facing())
    }

    /// カメラの向きを切り替える（ループ状態とは無関係）
    pub fn flip_camera(&mut self) -> Option<CameraFacing> {
        let camera = self.camera.as_mut()?;
        let facing = camera.facing().flipped();
        camera.set_facing(facing);
        Some(facing)
    }

    /// 検知開始。権限なし・カメラなし・実行中なら false
    pub fn start(&mut self) -> bool {
        if self.camera.is_none() || !self.gate.is_open() {
            return false;
        }
        self.state.start()
    }

    /// 検知停止。停止中なら false
    pub fn stop(&mut self) -> bool {
        self.state.stop()
    }

    /// 1サイクル実行
    pub async fn capture_cycle(&mut self) -> CycleOutcome {
        if !self.state.is_running() {
            return CycleOutcome::Skipped;
        }
        let generation = self.state.generation();
        let Some(camera) = self.camera.as_mut() else {
            return CycleOutcome::Skipped;
        };

        if !camera.permission_status().is_granted() {
            log::warn!("camera permission lost while running; stopping");
            self.state.revoke();
            self.gate.revoke();
            return CycleOutcome::Revoked;
        }

        let snapshot = match camera.take_picture(&self.options).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("capture failed: {}", e);
                return self.fail(generation);
            }
        };

        let detection = self.detector.detect(&snapshot).await;

        // 解析の成否に関わらず一時ファイルは削除
        if let Err(e) = self.store.delete(&snapshot).await {
            log::warn!("snapshot cleanup failed: {}: {}", snapshot.path().display(), e);
        }

        match detection {
            Ok(result) => {
                if self.state.commit_result(generation, result) {
                    log::info!(
                        "cycle {}: {:?} ({}%)",
                        self.state.cycle_count(),
                        result.classification,
                        result.confidence_percent
                    );
                    CycleOutcome::Detected(result)
                } else {
                    log::debug!("stale result discarded (generation {})", generation);
                    CycleOutcome::Discarded
                }
            }
            Err(e) => {
                log::warn!("analysis failed: {}", e);
                self.fail(generation)
            }
        }
    }

    fn fail(&mut self, generation: u64) -> CycleOutcome {
        if self.state.commit_failure(generation) {
            CycleOutcome::Failed
        } else {
            CycleOutcome::Discarded
        }
    }
}
