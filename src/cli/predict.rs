//! # predict 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/predict.rs`

use crate::cli::TargetArgs;

use clap::Args;
use std::path::PathBuf;

/// predict 子命令参数
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Charge-density parameters "rho0,a,b" (e/fm³, fm, fm)
    #[arg(long)]
    pub params: String,

    /// Scattering-angle range in degrees (e.g., "10-60")
    #[arg(short, long, default_value = "10-60")]
    pub range: String,

    /// Number of angles in the range
    #[arg(short, long, default_value_t = 51)]
    pub points: usize,

    /// Number of rows shown in the terminal table
    #[arg(long, default_value_t = 20)]
    pub show: usize,

    /// Write the prediction table to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the density profile to this CSV file
    #[arg(long)]
    pub density_csv: Option<PathBuf>,

    /// Cross-section plot (PNG or SVG, chosen by extension)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Density plot (PNG or SVG, chosen by extension)
    #[arg(long)]
    pub density_plot: Option<PathBuf>,

    /// Outer radius of the density profile in fm
    #[arg(long, default_value_t = 8.0)]
    pub r_max: f64,
}
