use clap::{Parser, Subcommand};
use helmet_guard_common::{CameraFacing, ViolationFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helmet-guard")]
#[command(about = "ヘルメット着用検知・安全監視ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// カメラ映像（画像フォルダ）を定期的に撮影して着用を判定
    Scan {
        /// 映像ソースの画像フォルダ
        #[arg(required = true)]
        source: PathBuf,

        /// 検知間隔（ミリ秒、省略時は設定値）
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// カメラの向き (front/back)
        #[arg(short, long)]
        facing: Option<CameraFacing>,

        /// 指定回数の検知後に停止して終了
        #[arg(short, long)]
        cycles: Option<u64>,

        /// 乱数シード（検知スタブの再現用）
        #[arg(long)]
        seed: Option<u64>,

        /// 起動直後に検知を開始
        #[arg(long)]
        auto: bool,

        /// カメラ利用の確認を省略して許可
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// ライブアラート一覧
    Alerts,

    /// 違反記録一覧
    Violations {
        /// 絞り込み (all/pending/resolved)
        #[arg(short, long, default_value = "all")]
        filter: ViolationFilter,

        /// Excelに出力
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 検知間隔（ミリ秒）を設定
        #[arg(long)]
        interval_ms: Option<u64>,

        /// 撮影品質 (0.0-1.0) を設定
        #[arg(long)]
        quality: Option<f32>,

        /// 大きなフレームを縮小して保存 (true/false)
        #[arg(long)]
        resize_snapshots: Option<bool>,

        /// カメラ利用の同意をリセット
        #[arg(long)]
        reset_access: bool,
    },
}
