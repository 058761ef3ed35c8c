//! 検知ループ制御
//!
//! 1つのタスクでユーザー操作とタイマーを多重化する。
//! - start: 即座に1サイクル実行し、以後は一定間隔で繰り返す
//! - stop: タイマーを破棄（最後の結果は残る）
//! - 終了: タイマーを破棄してカメラを解放
//!
//! サイクルはこのタスク内で完了まで待つため、同時に2つ走ることはない。

use super::capture::{CycleOutcome, Monitor};
use crate::camera::Camera;
use crate::detector::Detector;
use helmet_guard_common::{CameraFacing, LoopState};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// ユーザー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// 停止中なら開始、実行中なら停止
    Toggle,
    FlipCamera,
    Shutdown,
}

/// セッション設定
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// 検知間隔
    pub interval: Duration,
    /// 指定回数の検知で停止して終了
    pub stop_after: Option<u64>,
}

impl SessionOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stop_after: None,
        }
    }
}

/// 状態変化の通知先
pub struct Updates {
    state: watch::Sender<LoopState>,
    facing: watch::Sender<Option<CameraFacing>>,
}

impl Updates {
    pub fn new(
        state: watch::Sender<LoopState>,
        facing: watch::Sender<Option<CameraFacing>>,
    ) -> Self {
        Self { state, facing }
    }

    /// 受信側もまとめて生成
    pub fn channel() -> (Self, watch::Receiver<LoopState>, watch::Receiver<Option<CameraFacing>>) {
        let (state_tx, state_rx) = watch::channel(LoopState::new());
        let (facing_tx, facing_rx) = watch::channel(None);
        (Self::new(state_tx, facing_tx), state_rx, facing_rx)
    }

    fn publish<C: Camera, D: Detector>(&self, monitor: &Monitor<C, D>) {
        self.state.send_replace(monitor.state().clone());
    }
}

fn arm_timer(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    // 遅れたティックはまとめず後ろにずらす
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// セッションを実行し、終了後（アンマウント済み）のモニタを返す
///
/// コマンドチャネルが閉じるか `Command::Shutdown` を受けると終了する。
pub async fn run_session<C: Camera, D: Detector>(
    mut monitor: Monitor<C, D>,
    options: SessionOptions,
    mut commands: mpsc::Receiver<Command>,
    updates: Updates,
) -> Monitor<C, D> {
    // タイマーは高々1つ
    let mut ticker: Option<Interval> = None;
    updates.facing.send_replace(monitor.facing());
    updates.publish(&monitor);

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let command = match command {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::Toggle) if monitor.state().is_running() => Command::Stop,
                    Some(Command::Toggle) => Command::Start,
                    Some(other) => other,
                };

                match command {
                    Command::Start => {
                        if !monitor.start() {
                            log::debug!("start ignored (running or gate closed)");
                            continue;
                        }
                        ticker = Some(arm_timer(options.interval));
                        updates.publish(&monitor);
                        log::info!("detection started (interval {:?})", options.interval);

                        // 最初のサイクルはティックを待たずに実行
                        if run_cycle(&mut monitor, &updates, options).await {
                            break;
                        }
                    }
                    Command::Stop => {
                        if monitor.stop() {
                            ticker = None;
                            updates.publish(&monitor);
                            log::info!("detection stopped after {} scans", monitor.state().cycle_count());
                        }
                    }
                    Command::FlipCamera => {
                        let facing = monitor.flip_camera();
                        updates.facing.send_replace(facing);
                    }
                    Command::Toggle | Command::Shutdown => {}
                }
            }

            _ = next_tick(&mut ticker) => {
                if run_cycle(&mut monitor, &updates, options).await {
                    break;
                }
            }
        }

        if !monitor.state().is_running() {
            ticker = None;
        }
    }

    drop(ticker);
    monitor.unmount();
    log::info!("session closed");
    monitor
}

/// 1サイクル実行して通知。セッションを終えるべきなら true
async fn run_cycle<C: Camera, D: Detector>(
    monitor: &mut Monitor<C, D>,
    updates: &Updates,
    options: SessionOptions,
) -> bool {
    let outcome = monitor.capture_cycle().await;
    if outcome == CycleOutcome::Skipped {
        return false;
    }
    updates.publish(monitor);

    match options.stop_after {
        Some(limit) if monitor.state().cycle_count() >= limit => {
            monitor.stop();
            updates.publish(monitor);
            true
        }
        _ => false,
    }
}
