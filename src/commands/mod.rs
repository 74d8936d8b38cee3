//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `fit/`, `physics/`, `report/`, `utils/`
//! - 子模块: fit, predict

pub mod fit;
pub mod predict;

use crate::cli::{Commands, TargetArgs};
use crate::error::{NucradError, Result};
use crate::models::NuclearTarget;
use crate::physics::{ChargeDensity, IntegrationConfig, ScatteringModel};
use crate::report::{curves, export, plot, PlotOptions};
use crate::utils::output;

use std::path::Path;
use tracing::debug;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Fit(args) => fit::execute(args),
        Commands::Predict(args) => predict::execute(args),
    }
}

/// 配置 rayon 全局线程池，0 表示使用全部核心
pub fn configure_parallelism(jobs: usize) -> Result<()> {
    let threads = if jobs == 0 { num_cpus::get() } else { jobs };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| NucradError::Other(format!("Failed to build thread pool: {}", e)))?;
    debug!(threads, "Thread pool configured");
    Ok(())
}

/// 由 CLI 参数构建截面模型
fn build_model(args: &TargetArgs) -> Result<ScatteringModel> {
    let target = NuclearTarget::from_mev(args.z, args.energy)?;
    let integration = IntegrationConfig::new(args.samples, args.cutoff)?;
    Ok(ScatteringModel::new(target, integration))
}

/// 密度剖面采样点数
const PROFILE_POINTS: usize = 401;

/// 按需导出密度剖面 CSV 和密度图
fn write_density_outputs(
    density: &ChargeDensity,
    rms_radius_fm: f64,
    r_max_fm: f64,
    title: &str,
    csv_path: Option<&Path>,
    plot_path: Option<&Path>,
) -> Result<()> {
    if csv_path.is_none() && plot_path.is_none() {
        return Ok(());
    }
    if !r_max_fm.is_finite() || r_max_fm <= 0.0 {
        return Err(NucradError::InvalidArgument(format!(
            "profile radius must be positive, got {} fm",
            r_max_fm
        )));
    }

    let profile = curves::density_profile(density, r_max_fm, PROFILE_POINTS);

    if let Some(path) = csv_path {
        export::density_to_csv(&profile, path)?;
        output::print_success(&format!("Density profile saved to '{}'", path.display()));
    }

    if let Some(path) = plot_path {
        plot::generate_density_plot(
            &profile,
            rms_radius_fm,
            path,
            title,
            PlotOptions::for_path(path),
        )?;
        output::print_success(&format!("Density plot saved to '{}'", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_args() -> TargetArgs {
        TargetArgs {
            z: 20,
            energy: 250.0,
            samples: 1000,
            cutoff: 5.0,
        }
    }

    #[test]
    fn test_build_model() {
        let model = build_model(&target_args()).unwrap();
        assert_eq!(model.target().z, 20);
        assert!((model.target().energy_mev() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_model_rejects_bad_target() {
        let mut args = target_args();
        args.z = 0;
        assert!(build_model(&args).is_err());

        let mut args = target_args();
        args.samples = 0;
        assert!(build_model(&args).is_err());
    }

    #[test]
    fn test_density_csv_written() {
        let model = build_model(&target_args()).unwrap();
        let params = crate::models::NuclearParams::new(0.0743, 3.8, 0.5).unwrap();
        let density = model.density(&params.to_si());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("density.csv");
        write_density_outputs(&density, 3.5, 8.0, "Ca", Some(&path), None).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), PROFILE_POINTS + 1);
        assert!(write_density_outputs(&density, 3.5, -1.0, "Ca", Some(&path), None).is_err());
    }
}
