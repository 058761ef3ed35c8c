//! 検知ループ制御テスト
//!
//! 仮想時間（start_paused）でタイマー・開始/停止・終了処理を検証

use helmet_guard::camera::{Camera, CaptureOptions, SnapshotRef};
use helmet_guard::detector::Detector;
use helmet_guard::error::{HelmetGuardError, Result};
use helmet_guard::monitor::{run_session, Command, Monitor, SessionOptions, Updates};
use helmet_guard::store::SnapshotStore;
use helmet_guard_common::{
    CameraFacing, Classification, DetectionResult, LoopState, PermissionStatus, StatusMessage,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use tokio::sync::{mpsc, watch};

const PERIOD: Duration = Duration::from_millis(1500);

/// テストから観測するカメラの状態
#[derive(Clone)]
struct Probe {
    permission: Arc<Mutex<PermissionStatus>>,
    captures: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl Probe {
    fn new(permission: PermissionStatus) -> Self {
        Self {
            permission: Arc::new(Mutex::new(permission)),
            captures: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    fn set_permission(&self, permission: PermissionStatus) {
        *self.permission.lock().unwrap() = permission;
    }
}

struct FakeCamera {
    probe: Probe,
    dir: PathBuf,
    facing: CameraFacing,
    fail: bool,
}

impl Camera for FakeCamera {
    fn permission_status(&self) -> PermissionStatus {
        *self.probe.permission.lock().unwrap()
    }

    fn request_permission(&mut self) -> PermissionStatus {
        self.permission_status()
    }

    fn facing(&self) -> CameraFacing {
        self.facing
    }

    fn set_facing(&mut self, facing: CameraFacing) {
        self.facing = facing;
    }

    async fn take_picture(&mut self, _options: &CaptureOptions) -> Result<SnapshotRef> {
        let n = self.probe.captures.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(HelmetGuardError::CaptureFailure("sensor offline".into()));
        }
        let path = self.dir.join(format!("snap-{}.jpg", n));
        std::fs::write(&path, b"jpeg")?;
        Ok(SnapshotRef::new(path))
    }

    fn release(&mut self) {
        self.probe.released.store(true, Ordering::SeqCst);
    }
}

/// 固定の判定を返す検知器
struct FakeDetector {
    delay: Duration,
    fail: bool,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeDetector {
    fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Detector for FakeDetector {
    async fn detect(&mut self, _snapshot: &SnapshotRef) -> Result<DetectionResult> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(HelmetGuardError::AnalysisFailure("model unavailable".into()));
        }
        Ok(DetectionResult::new(Classification::Compliant, 90))
    }
}

struct Harness {
    probe: Probe,
    snap_dir: TempDir,
    monitor: Monitor<FakeCamera, FakeDetector>,
}

fn harness(permission: PermissionStatus, camera_fails: bool, detector: FakeDetector) -> Harness {
    let probe = Probe::new(permission);
    let snap_dir = tempdir().expect("Failed to create temp dir");
    let camera = FakeCamera {
        probe: probe.clone(),
        dir: snap_dir.path().to_path_buf(),
        facing: CameraFacing::Back,
        fail: camera_fails,
    };
    let mut monitor = Monitor::new(detector, SnapshotStore::new(), CaptureOptions::default());
    monitor.mount(camera);
    Harness { probe, snap_dir, monitor }
}

fn granted() -> Harness {
    harness(PermissionStatus::Granted, false, FakeDetector::new())
}

fn snapshot(rx: &watch::Receiver<LoopState>) -> LoopState {
    rx.borrow().clone()
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// 開始直後にティックを待たず1回検知する
#[tokio::test(start_paused = true)]
async fn test_start_runs_one_cycle_immediately() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(1).await;
        let state = snapshot(&state_rx);
        assert!(state.is_running());
        assert_eq!(state.cycle_count(), 1);
        assert_eq!(probe.captures(), 1);

        // 最初のティック前は増えない
        sleep_ms(1400).await;
        assert_eq!(snapshot(&state_rx).cycle_count(), 1);

        sleep_ms(200).await;
        assert_eq!(snapshot(&state_rx).cycle_count(), 2);

        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// N回のティック後はカウンタ = N + 1
#[tokio::test(start_paused = true)]
async fn test_cycle_count_after_intervals() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(10).await;
        sleep_ms(1500 * 3).await;

        assert_eq!(snapshot(&state_rx).cycle_count(), 4);
        assert_eq!(probe.captures(), 4);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// 停止後はサイクルが走らない
#[tokio::test(start_paused = true)]
async fn test_stop_cancels_future_cycles() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(1600).await;
        tx.send(Command::Stop).await.unwrap();
        sleep_ms(1).await;

        let stopped = snapshot(&state_rx);
        assert!(!stopped.is_running());
        assert_eq!(stopped.status(), StatusMessage::Stopped);
        assert_eq!(stopped.cycle_count(), 2);
        assert!(stopped.last_result().is_some());

        sleep_ms(10_000).await;
        assert_eq!(snapshot(&state_rx), stopped);
        assert_eq!(probe.captures(), 2);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// 実行中の start と停止中の stop は何もしない
#[tokio::test(start_paused = true)]
async fn test_redundant_start_and_stop_are_noops() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Stop).await.unwrap();
        sleep_ms(1).await;
        assert_eq!(snapshot(&state_rx).status(), StatusMessage::Idle);

        tx.send(Command::Start).await.unwrap();
        sleep_ms(1).await;
        let generation = snapshot(&state_rx).generation();

        tx.send(Command::Start).await.unwrap();
        sleep_ms(1).await;
        let state = snapshot(&state_rx);
        assert_eq!(state.generation(), generation);
        assert_eq!(state.cycle_count(), 1);
        assert_eq!(probe.captures(), 1);

        // タイマーが二重になっていない
        sleep_ms(1500).await;
        assert_eq!(probe.captures(), 2);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// Toggle は停止中なら開始、実行中なら停止
#[tokio::test(start_paused = true)]
async fn test_toggle_and_flip_camera() {
    let Harness { monitor, snap_dir: _dir, .. } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Toggle).await.unwrap();
        sleep_ms(1).await;
        assert!(snapshot(&state_rx).is_running());

        tx.send(Command::FlipCamera).await.unwrap();
        sleep_ms(1).await;
        assert_eq!(*facing_rx.borrow(), Some(CameraFacing::Front));
        // 向きの切替はループ状態に影響しない
        assert!(snapshot(&state_rx).is_running());

        tx.send(Command::Toggle).await.unwrap();
        sleep_ms(1).await;
        assert!(!snapshot(&state_rx).is_running());
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// 実行中に終了するとタイマーが止まりカメラが解放される
#[tokio::test(start_paused = true)]
async fn test_teardown_while_running() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(10).await;
        tx.send(Command::Shutdown).await.unwrap();
    };

    let (monitor, ()) =
        tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);

    assert!(probe.released.load(Ordering::SeqCst));
    assert!(!monitor.is_mounted());

    sleep_ms(10_000).await;
    assert_eq!(probe.captures(), 1);
    // 送信側は破棄済み
    assert!(state_rx.has_changed().is_err());
}

/// コマンドチャネルが閉じても終了する
#[tokio::test(start_paused = true)]
async fn test_closed_channel_ends_session() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, _state_rx, _facing_rx) = Updates::channel();

    tx.send(Command::Start).await.unwrap();
    drop(tx);

    run_session(monitor, SessionOptions::new(PERIOD), rx, updates).await;
    assert!(probe.released.load(Ordering::SeqCst));
    assert_eq!(probe.captures(), 1);
}

/// 撮影失敗は一時表示のみでループは続く
#[tokio::test(start_paused = true)]
async fn test_capture_failure_keeps_loop_running() {
    let Harness { probe, monitor, snap_dir: _dir } =
        harness(PermissionStatus::Granted, true, FakeDetector::new());
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(1).await;

        let state = snapshot(&state_rx);
        assert!(state.is_running());
        assert_eq!(state.status().to_string(), "Detection Error - Retrying...");
        assert_eq!(state.cycle_count(), 0);

        // 次のティックが再試行
        sleep_ms(1500).await;
        assert_eq!(probe.captures(), 2);
        assert!(snapshot(&state_rx).is_running());
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// 解析失敗でも一時ファイルは削除される
#[tokio::test(start_paused = true)]
async fn test_analysis_failure_cleans_up_snapshot() {
    let mut detector = FakeDetector::new();
    detector.fail = true;
    let Harness { probe, snap_dir, monitor } = harness(PermissionStatus::Granted, false, detector);
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(1600).await;

        let state = snapshot(&state_rx);
        assert_eq!(state.status(), StatusMessage::Retrying);
        assert_eq!(state.cycle_count(), 0);
        assert_eq!(probe.captures(), 2);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);

    let leftovers = std::fs::read_dir(snap_dir.path()).unwrap().count();
    assert_eq!(leftovers, 0, "一時ファイルが残っている");
}

/// 成功時も一時ファイルは削除される
#[tokio::test(start_paused = true)]
async fn test_snapshots_deleted_after_detection() {
    let Harness { snap_dir, monitor, .. } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, _state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(4600).await;
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
    assert_eq!(std::fs::read_dir(snap_dir.path()).unwrap().count(), 0);
}

/// 実行中の権限喪失で強制停止
#[tokio::test(start_paused = true)]
async fn test_permission_revoked_while_running() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(10).await;
        probe.set_permission(PermissionStatus::Denied);

        sleep_ms(1500).await;
        let state = snapshot(&state_rx);
        assert!(!state.is_running());
        assert_eq!(state.status().to_string(), "Camera Access Revoked");
        assert_eq!(state.cycle_count(), 1);

        sleep_ms(10_000).await;
        assert_eq!(probe.captures(), 1);

        // ゲートが閉じているので再開できない
        tx.send(Command::Start).await.unwrap();
        sleep_ms(1).await;
        assert!(!snapshot(&state_rx).is_running());
        tx.send(Command::Shutdown).await.unwrap();
    };

    let (monitor, ()) =
        tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
    assert_eq!(monitor.gate(), helmet_guard::monitor::GateView::Denied);
}

/// 権限がなければ開始できない
#[tokio::test(start_paused = true)]
async fn test_start_ignored_when_gate_closed() {
    let Harness { probe, monitor, snap_dir: _dir } =
        harness(PermissionStatus::Denied, false, FakeDetector::new());
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(5000).await;
        assert!(!snapshot(&state_rx).is_running());
        assert_eq!(probe.captures(), 0);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
}

/// 指定回数で停止して終了
#[tokio::test(start_paused = true)]
async fn test_stop_after_cycles() {
    let Harness { probe, monitor, snap_dir: _dir } = granted();
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();
    let options = SessionOptions { interval: PERIOD, stop_after: Some(3) };

    tx.send(Command::Start).await.unwrap();
    let monitor = run_session(monitor, options, rx, updates).await;

    let state = snapshot(&state_rx);
    assert_eq!(state.cycle_count(), 3);
    assert_eq!(state.status(), StatusMessage::Stopped);
    assert_eq!(probe.captures(), 3);
    assert!(!monitor.is_mounted());
    drop(tx);
}

/// 解析が間隔より長くてもサイクルは重ならない
#[tokio::test(start_paused = true)]
async fn test_slow_cycles_never_overlap() {
    let mut detector = FakeDetector::new();
    detector.delay = Duration::from_millis(2000);
    let max_in_flight = detector.max_in_flight.clone();
    let Harness { probe, monitor, snap_dir: _dir } = harness(PermissionStatus::Granted, false, detector);
    let (tx, rx) = mpsc::channel(8);
    let (updates, state_rx, _facing_rx) = Updates::channel();

    let driver = async {
        tx.send(Command::Start).await.unwrap();
        sleep_ms(5000).await;
        assert_eq!(snapshot(&state_rx).cycle_count(), 2);
        assert_eq!(probe.captures(), 3);
        tx.send(Command::Shutdown).await.unwrap();
    };

    tokio::join!(run_session(monitor, SessionOptions::new(PERIOD), rx, updates), driver);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}
