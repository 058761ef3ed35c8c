use clap::Parser;
use dialoguer::Confirm;
use helmet_guard::{cli, config, error, render};
use helmet_guard::camera::{CaptureOptions, FolderCamera};
use helmet_guard::detector::RandomDetector;
use helmet_guard::monitor::{run_session, Command, GateView, Monitor, SessionOptions, Updates};
use helmet_guard::store::SnapshotStore;
use helmet_guard_common::{
    filter_violations, present, sample_alerts, sample_violation_stats, sample_violations,
    PermissionStatus,
};
use cli::{Cli, Commands};
use config::Config;
use error::{HelmetGuardError, Result};
use indicatif::ProgressBar;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::load()?;

    match cli.command {
        Commands::Scan { source, interval_ms, facing, cycles, seed, auto, yes } => {
            let mut config = config;
            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
            }
            config.validate()?;

            println!("📸 helmet-guard - ヘルメット検知\n");

            let spinner = ProgressBar::new_spinner();
            spinner.set_message("Initializing Camera...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let permission = match config.camera_access {
                Some(true) => PermissionStatus::Granted,
                Some(false) => PermissionStatus::Denied,
                None => PermissionStatus::Undetermined,
            };
            let camera = FolderCamera::open(&source, config.snapshot_dir())?
                .with_permission(permission)
                .with_facing(facing.unwrap_or(config.default_facing))
                .with_consent(move || {
                    if yes {
                        return Some(true);
                    }
                    // 非対話環境では回答なし
                    Confirm::new()
                        .with_prompt("カメラへのアクセスを許可しますか？")
                        .default(false)
                        .interact()
                        .ok()
                });
            spinner.finish_and_clear();
            println!("✔ {}枚のフレームを検出\n", camera.frame_count());

            let store = SnapshotStore::new();
            let mut detector = RandomDetector::new(
                store,
                config.analysis_delay(),
                config.non_compliant_threshold,
            );
            if let Some(seed) = seed {
                detector = detector.with_seed(seed);
            }
            let options = CaptureOptions {
                quality: config.capture_quality,
                skip_processing: !config.resize_snapshots,
            };

            let mut monitor = Monitor::new(detector, store, options);
            let initial = monitor.mount(camera);
            if initial != GateView::Granted {
                println!("{}\n", render::render_gate(initial));
            }

            let admission = monitor.admit(config.camera_access, yes);
            if let Some(granted) = admission.remember {
                if let Err(e) = config.set_camera_access(Some(granted)) {
                    log::warn!("failed to save camera access: {}", e);
                }
            }
            match admission.view {
                GateView::Granted => println!("{}", render::render_gate(GateView::Granted)),
                GateView::Denied => {
                    // 拒否時は再要求せず終了
                    println!("⚠ {}", HelmetGuardError::PermissionDenied);
                    return Ok(());
                }
                GateView::Loading => {
                    println!("⚠ カメラ利用の確認ができませんでした。--yes で許可して実行できます");
                    return Ok(());
                }
            }

            run_scan(monitor, SessionOptions { interval: config.interval(), stop_after: cycles }, auto).await;
        }

        Commands::Alerts => {
            print!("{}", render::render_alerts(&sample_alerts()));
        }

        Commands::Violations { filter, export } => {
            let violations = sample_violations();
            let filtered = filter_violations(&violations, filter);
            print!(
                "{}",
                render::render_violations(&sample_violation_stats(), &filtered, filter)
            );

            if let Some(path) = export {
                let title = format!("Violations ({})", chrono::Local::now().format("%Y-%m-%d"));
                println!("\n- Excelを生成中...");
                let buffer = helmet_guard_common::export::excel_core::generate_violations_buffer(
                    &filtered, &title,
                )?;
                std::fs::write(&path, buffer)?;
                println!("✔ Excel出力: {}", path.display());
            }
        }

        Commands::Config { show, interval_ms, quality, resize_snapshots, reset_access } => {
            let mut config = config;
            let mut changed = false;

            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
                changed = true;
            }
            if let Some(q) = quality {
                config.capture_quality = q;
                changed = true;
            }
            if let Some(resize) = resize_snapshots {
                config.resize_snapshots = resize;
                changed = true;
            }
            if reset_access {
                config.camera_access = None;
                changed = true;
            }
            if changed {
                config.validate()?;
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  検知間隔: {}ms", config.interval_ms);
                println!("  撮影品質: {}", config.capture_quality);
                println!("  解析待ち時間: {}ms", config.analysis_delay_ms);
                println!("  未着用しきい値: {}", config.non_compliant_threshold);
                println!("  スナップショット保存先: {}", config.snapshot_dir().display());
                println!(
                    "  スナップショット縮小: {}",
                    if config.resize_snapshots { "有効" } else { "無効" }
                );
                println!("  カメラの向き: {}", config.default_facing);
                println!(
                    "  カメラ利用: {}",
                    match config.camera_access {
                        Some(true) => "許可",
                        Some(false) => "拒否",
                        None => "未確認",
                    }
                );
            }
        }
    }

    Ok(())
}

/// 検知セッションを対話操作付きで実行
async fn run_scan(
    monitor: Monitor<FolderCamera, RandomDetector>,
    options: SessionOptions,
    auto: bool,
) {
    let (tx, rx) = mpsc::channel(16);
    let (updates, mut state_rx, mut facing_rx) = Updates::channel();

    println!("操作: [s]開始/停止 [f]カメラ切替 [q]終了\n");

    // 標準入力はランタイム終了を妨げないよう専用スレッドで読む
    let stdin_tx = tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "s" | "S" => Command::Toggle,
                "f" | "F" => Command::FlipCamera,
                "q" | "Q" => Command::Shutdown,
                "" => continue,
                other => {
                    println!("⚠ 不明な操作: {}", other);
                    continue;
                }
            };
            if stdin_tx.blocking_send(command).is_err() {
                break;
            }
        }
    });

    let signal_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_tx.send(Command::Shutdown).await;
        }
    });

    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = state_rx.borrow_and_update().clone();
                    let facing = *facing_rx.borrow();
                    println!("{}\n", render::render_status(&present(&state), facing));
                }
                changed = facing_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Some(facing) = *facing_rx.borrow_and_update() {
                        println!("⟲ camera: {}\n", facing);
                    }
                }
            }
        }
    });

    if auto {
        let _ = tx.send(Command::Start).await;
    }
    drop(tx);

    let monitor = run_session(monitor, options, rx, updates).await;
    let _ = printer.await;

    println!(
        "✅ 検知終了 (スキャン数: {})",
        monitor.state().cycle_count()
    );
}
