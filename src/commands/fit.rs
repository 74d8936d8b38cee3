//! # fit 子命令实现
//!
//! 从测量截面拟合 Fermi 电荷密度参数并报告 rms 电荷半径。
//!
//! ## 流程
//! 1. 读取测量 CSV
//! 2. 由 CLI 参数构建截面模型和拟合配置
//! 3. 约束拟合（spinner 显示进度）
//! 4. 打印结果表，按需导出 CSV 和图表
//!
//! ## 依赖关系
//! - 使用 `cli/fit.rs` 定义的 FitArgs
//! - 使用 `parsers/`、`fit/`、`report/`

use crate::cli::fit::FitArgs;
use crate::commands::{build_model, write_density_outputs};
use crate::error::Result;
use crate::fit::config::{parse_bounds, parse_parameters};
use crate::fit::{FitConfig, ParameterFitter};
use crate::models::{FitResult, ParameterBounds, ScatteringData};
use crate::parsers;
use crate::report::curves::{self, CurvePoint, CURVE_POINTS};
use crate::report::{export, plot, PlotOptions};
use crate::utils::{output, progress};

use tabled::{Table, Tabled};
use tracing::info;

/// 结果表的一行
#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "Quantity")]
    quantity: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

/// 逐点对比表的一行
#[derive(Debug, Clone, Tabled)]
struct PointRow {
    #[tabled(rename = "θ (°)")]
    theta: String,
    #[tabled(rename = "Measured (mb/sr)")]
    measured: String,
    #[tabled(rename = "Fitted (mb/sr)")]
    fitted: String,
    #[tabled(rename = "Pull")]
    pull: String,
}

/// 执行 fit 子命令
pub fn execute(args: FitArgs) -> Result<()> {
    output::print_header("Fermi Charge-Density Fit");

    let data = parsers::load_scattering_csv(&args.input)?;
    let (theta_min, theta_max) = data.angle_range();
    output::print_info(&format!(
        "Loaded {} measurements from '{}' ({:.1}°-{:.1}°)",
        data.len(),
        args.input.display(),
        theta_min.to_degrees(),
        theta_max.to_degrees()
    ));

    let model = build_model(&args.target)?;
    output::print_info(&format!(
        "Target: Z = {}, electron energy = {:.1} MeV",
        model.target().z,
        model.target().energy_mev()
    ));

    let config = build_config(&args)?;
    let fitter = ParameterFitter::new(model, config)?;
    let start = fitter.config().start();
    output::print_info(&format!(
        "Starting point: rho0 = {}, a = {}, b = {}",
        start[0], start[1], start[2]
    ));

    let spinner = progress::create_spinner("Fitting charge density...");
    let fitted = fitter.fit(&data);
    spinner.finish_and_clear();
    let result = fitted?;

    info!(rms_radius_fm = result.rms_radius_fm(), "Fit finished");

    let points = curves::compare_with_data(fitter.model(), &data, &result.params)?;

    output::print_header("Fit Results");
    println!("{}", Table::new(result_rows(&result, data.len())));

    output::print_header("Measured vs Fitted");
    println!("{}", Table::new(point_rows(&points)));

    output::print_success(&format!(
        "rms charge radius: {:.4} fm",
        result.rms_radius_fm()
    ));

    write_outputs(&args, &fitter, &data, &result, &points)
}

/// 由 CLI 参数构建拟合配置
fn build_config(args: &FitArgs) -> Result<FitConfig> {
    let bounds = ParameterBounds {
        rho0: parse_bounds(&args.rho0_bounds)?,
        a: parse_bounds(&args.a_bounds)?,
        b: parse_bounds(&args.b_bounds)?,
    };

    let mut config = FitConfig {
        bounds,
        initial_guess: parse_parameters(&args.initial)?,
        ..FitConfig::default()
    }
    .with_max_iterations(args.max_iterations);
    config.solver.max_outer_iterations = args.max_outer;
    config.solver.constraint_tolerance = args.charge_tolerance;

    config.validate()?;
    Ok(config)
}

fn result_rows(result: &FitResult, n_points: usize) -> Vec<ResultRow> {
    let p = &result.params;
    let reduced = result
        .reduced_chi_square(n_points)
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string());

    vec![
        ResultRow {
            quantity: "rho0",
            value: format!("{:.6}", p.rho0()),
            unit: "e/fm³",
        },
        ResultRow {
            quantity: "a",
            value: format!("{:.5}", p.a()),
            unit: "fm",
        },
        ResultRow {
            quantity: "b",
            value: format!("{:.5}", p.b()),
            unit: "fm",
        },
        ResultRow {
            quantity: "Total charge Q",
            value: format!("{:.6}", result.total_charge),
            unit: "e",
        },
        ResultRow {
            quantity: "Z - Q",
            value: format!("{:.3e}", result.constraint_residual),
            unit: "e",
        },
        ResultRow {
            quantity: "χ²",
            value: format!("{:.4}", result.objective),
            unit: "",
        },
        ResultRow {
            quantity: "χ²/dof",
            value: reduced,
            unit: "",
        },
        ResultRow {
            quantity: "Iterations",
            value: format!("{} ({} multiplier updates)", result.iterations, result.outer_iterations),
            unit: "",
        },
        ResultRow {
            quantity: "rms radius",
            value: format!("{:.4}", result.rms_radius_fm()),
            unit: "fm",
        },
    ]
}

fn point_rows(points: &[CurvePoint]) -> Vec<PointRow> {
    points
        .iter()
        .map(|p| PointRow {
            theta: format!("{:.2}", p.theta_deg),
            measured: format!("{:.4e}", p.measured),
            fitted: format!("{:.4e}", p.predicted),
            pull: format!("{:+.3}", p.pull()),
        })
        .collect()
}

/// 按需写出对比表、截面图、密度剖面和密度图
fn write_outputs(
    args: &FitArgs,
    fitter: &ParameterFitter,
    data: &ScatteringData,
    result: &FitResult,
    points: &[CurvePoint],
) -> Result<()> {
    if let Some(path) = &args.output_csv {
        export::comparison_to_csv(points, path)?;
        output::print_success(&format!("Fitted cross sections saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot {
        let (lo, hi) = data.angle_range();
        let grid = curves::angle_grid(lo.to_degrees(), hi.to_degrees(), CURVE_POINTS)?;
        let curve = curves::cross_section_curve(fitter.model(), &result.params, &grid)?;
        let target = fitter.model().target();
        let title = format!(
            "{}: Z = {}, E = {:.1} MeV",
            data.name,
            target.z,
            target.energy_mev()
        );
        plot::generate_cross_section_plot(points, &curve, path, &title, PlotOptions::for_path(path))?;
        output::print_success(&format!("Cross-section plot saved to '{}'", path.display()));
    }

    let density = fitter.model().density(&result.params.to_si());
    write_density_outputs(
        &density,
        result.rms_radius_fm(),
        args.r_max,
        &format!("{}: fitted charge density", data.name),
        args.density_csv.as_deref(),
        args.density_plot.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn fit_args(extra: &[&str]) -> FitArgs {
        let mut argv = vec!["nucrad", "fit", "data.csv", "-z", "20", "-e", "250"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Fit(args) => args,
            _ => panic!("expected fit command"),
        }
    }

    #[test]
    fn test_default_config_from_cli() {
        let config = build_config(&fit_args(&[])).unwrap();
        assert_eq!(config, FitConfig::default());
    }

    #[test]
    fn test_config_overrides() {
        let config = build_config(&fit_args(&[
            "--a-bounds",
            "3.5-4.5",
            "--initial",
            "0.075,3.9,0.5",
            "--max-iterations",
            "50",
        ]))
        .unwrap();
        assert_eq!(config.bounds.a, (3.5, 4.5));
        assert_eq!(config.initial_guess, [0.075, 3.9, 0.5]);
        assert_eq!(config.solver.max_iterations, 50);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(build_config(&fit_args(&["--b-bounds", "0.7-0.3"])).is_err());
        assert!(build_config(&fit_args(&["--initial", "0.07,4"])).is_err());
        assert!(build_config(&fit_args(&["--max-iterations", "0"])).is_err());
    }

    #[test]
    fn test_result_table_rows() {
        let result = FitResult {
            params: crate::models::NuclearParams::new(0.0743, 3.8, 0.5).unwrap(),
            objective: 8.0,
            constraint_residual: 1e-8,
            total_charge: 20.0,
            rms_radius: 3.48e-15,
            iterations: 12,
            outer_iterations: 3,
        };
        let rows = result_rows(&result, 10);
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[6].value, "1.0000");
        assert_eq!(rows[8].value, "3.4800");
        assert_eq!(result_rows(&result, 2)[6].value, "-");
    }
}
