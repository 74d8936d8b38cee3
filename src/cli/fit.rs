//! # fit 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fit.rs`

use crate::cli::TargetArgs;

use clap::Args;
use std::path::PathBuf;

/// fit 子命令参数
#[derive(Args, Debug)]
pub struct FitArgs {
    /// Measured cross sections: CSV with 'theta (degree)', 'cross-section (mb/sr)', 'error (mb/sr)'
    pub input: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Bounds on rho0 in e/fm³ (e.g., "0.06-0.08")
    #[arg(long, default_value = "0.06-0.08")]
    pub rho0_bounds: String,

    /// Bounds on the half-density radius a in fm (e.g., "3-5")
    #[arg(long, default_value = "3-5")]
    pub a_bounds: String,

    /// Bounds on the surface thickness b in fm (e.g., "0.3-0.7")
    #[arg(long, default_value = "0.3-0.7")]
    pub b_bounds: String,

    /// Initial guess "rho0,a,b" (clipped into the bounds before fitting)
    #[arg(long, default_value = "0.07,4,5")]
    pub initial: String,

    /// Maximum number of Levenberg-Marquardt iterations
    #[arg(long, default_value_t = 500)]
    pub max_iterations: usize,

    /// Maximum number of Lagrange multiplier updates
    #[arg(long, default_value_t = 40)]
    pub max_outer: usize,

    /// Accepted |Z - Q| at convergence, in units of e
    #[arg(long, default_value_t = 1e-6)]
    pub charge_tolerance: f64,

    /// Write measured vs fitted cross sections to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Write the fitted density profile to this CSV file
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
