//! # predict 子命令实现
//!
//! 给定电荷密度参数，计算角度网格上的 Rutherford、Mott、
//! 形状因子和实验截面，以及总电荷和 rms 半径。
//!
//! ## 依赖关系
//! - 使用 `cli/predict.rs` 定义的 PredictArgs
//! - 使用 `physics/`、`report/`

use crate::cli::predict::PredictArgs;
use crate::commands::{build_model, write_density_outputs};
use crate::error::Result;
use crate::fit::config::{parse_bounds, parse_parameters};
use crate::models::NuclearParams;
use crate::physics::constants::FEMTOMETRE;
use crate::report::curves::{self, PredictionRow};
use crate::report::{export, plot, PlotOptions};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 总电荷与 Z 的相对偏差超过此值时给出警告
const CHARGE_WARNING_THRESHOLD: f64 = 1e-3;

/// 预测表的一行
#[derive(Debug, Clone, Tabled)]
struct Row {
    #[tabled(rename = "θ (°)")]
    theta: String,
    #[tabled(rename = "Rutherford (mb/sr)")]
    rutherford: String,
    #[tabled(rename = "Mott (mb/sr)")]
    mott: String,
    #[tabled(rename = "F(q)")]
    form_factor: String,
    #[tabled(rename = "dσ/dΩ (mb/sr)")]
    experiment: String,
}

impl From<&PredictionRow> for Row {
    fn from(r: &PredictionRow) -> Self {
        Row {
            theta: format!("{:.2}", r.theta_deg),
            rutherford: format!("{:.4e}", r.rutherford),
            mott: format!("{:.4e}", r.mott),
            form_factor: format!("{:+.5}", r.form_factor),
            experiment: format!("{:.4e}", r.experiment),
        }
    }
}

/// 执行 predict 子命令
pub fn execute(args: PredictArgs) -> Result<()> {
    output::print_header("Elastic Scattering Prediction");

    let model = build_model(&args.target)?;
    let params = NuclearParams::from_array(parse_parameters(&args.params)?)?;
    output::print_info(&format!(
        "Target: Z = {}, electron energy = {:.1} MeV",
        model.target().z,
        model.target().energy_mev()
    ));
    output::print_info(&format!("Parameters: {}", params));

    let (start, end) = parse_bounds(&args.range)?;
    let angles = curves::angle_grid(start, end, args.points)?;
    let rows = curves::prediction_table(&model, &params, &angles)?;

    let density = model.density(&params.to_si());
    let total_charge = density.total_charge();
    let rms_radius_fm = density.rms_radius(args.target.z)? / FEMTOMETRE;

    let z = args.target.z as f64;
    if ((total_charge - z) / z).abs() > CHARGE_WARNING_THRESHOLD {
        output::print_warning(&format!(
            "Total charge {:.4} e differs from Z = {}; cross sections are not normalised",
            total_charge, args.target.z
        ));
    }

    output::print_header(&format!(
        "Cross Sections ({} of {} angles)",
        args.show.min(rows.len()),
        rows.len()
    ));
    let table_rows: Vec<Row> = rows.iter().take(args.show).map(Row::from).collect();
    println!("{}", Table::new(&table_rows));

    output::print_info(&format!("Total charge Q = {:.6} e", total_charge));
    output::print_success(&format!("rms charge radius: {:.4} fm", rms_radius_fm));

    if let Some(path) = &args.output {
        export::prediction_to_csv(&rows, path)?;
        output::print_success(&format!("Prediction saved to '{}'", path.display()));
    }

    if let Some(path) = &args.plot {
        let curve: Vec<(f64, f64)> = rows.iter().map(|r| (r.theta_deg, r.experiment)).collect();
        let title = format!(
            "Z = {}, E = {:.1} MeV",
            model.target().z,
            model.target().energy_mev()
        );
        plot::generate_cross_section_plot(&[], &curve, path, &title, PlotOptions::for_path(path))?;
        output::print_success(&format!("Cross-section plot saved to '{}'", path.display()));
    }

    write_density_outputs(
        &density,
        rms_radius_fm,
        args.r_max,
        &format!("Z = {}: charge density", args.target.z),
        args.density_csv.as_deref(),
        args.density_plot.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn predict_args(extra: &[&str]) -> PredictArgs {
        let mut argv = vec!["nucrad", "predict", "-z", "20", "-e", "250"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Predict(args) => args,
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn test_predict_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prediction.csv");
        let density = dir.path().join("density.csv");

        let args = predict_args(&[
            "--params",
            "0.0743,3.8,0.5",
            "--range",
            "10-30",
            "--points",
            "5",
            "--output",
            out.to_str().unwrap(),
            "--density-csv",
            density.to_str().unwrap(),
        ]);
        execute(args).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().count(), 6);
        assert!(content.lines().nth(1).unwrap().starts_with("10.0000,"));
        assert!(density.exists());
    }

    #[test]
    fn test_predict_rejects_bad_params() {
        assert!(execute(predict_args(&["--params", "0.07,4"])).is_err());
        assert!(execute(predict_args(&["--params", "0.07,4,-0.5"])).is_err());
        assert!(execute(predict_args(&["--params", "0.07,4,0.5", "--range", "0-30"])).is_err());
    }

    #[test]
    fn test_row_formatting() {
        let row = Row::from(&PredictionRow {
            theta_deg: 12.5,
            rutherford: 1234.5,
            mott: 1000.0,
            form_factor: 0.5,
            experiment: 250.0,
        });
        assert_eq!(row.theta, "12.50");
        assert_eq!(row.form_factor, "+0.50000");
        assert_eq!(row.experiment, "2.5000e2");
    }
}
