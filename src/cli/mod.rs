//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `fit`: 从测量截面拟合电荷密度参数，给出 rms 半径
//! - `predict`: 给定参数计算截面、形状因子和密度剖面
//!
//! 全局选项：`-v/-q/--log-file` 控制日志，`--jobs` 控制并行线程数。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: fit, predict

pub mod fit;
pub mod predict;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// nucrad - 由弹性电子散射数据确定核电荷半径
#[derive(Parser)]
#[command(name = "nucrad")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Nuclear charge radius from elastic electron-scattering cross sections", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Worker threads for per-angle evaluation (0 = all cores)
    #[arg(short, long, global = true, env = "NUCRAD_JOBS", default_value_t = 0)]
    pub jobs: usize,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Fit Fermi charge-density parameters to measured cross sections
    Fit(fit::FitArgs),

    /// Compute cross sections and the charge density for given parameters
    Predict(predict::PredictArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 靶核与积分设置
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Proton number Z of the target nucleus
    #[arg(short, long, env = "NUCRAD_Z")]
    pub z: u32,

    /// Total energy of the incident electron in MeV
    #[arg(short, long, env = "NUCRAD_ENERGY")]
    pub energy: f64,

    /// Number of radial samples in the trapezoidal integrals
    #[arg(long, default_value_t = crate::physics::density::DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Integration cutoff radius in units of the surface thickness b (R = a + cutoff·b)
    #[arg(long, default_value_t = crate::physics::density::DEFAULT_CUTOFF_WIDTHS)]
    pub cutoff: f64,
}
