//! # 拟合数据导出
//!
//! 导出拟合结果和预测曲线到 CSV 文件。
//!
//! ## 支持格式
//! - 对比表: theta_deg, measured, error, predicted, pull
//! - 密度剖面: r_fm, rho_e_fm3
//! - 预测表: theta_deg, rutherford, mott, form_factor, experiment
//!
//! 截面单位均为 mb/sr。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs`、`commands/predict.rs` 调用
//! - 使用 `report/curves.rs` 的数据序列
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{NucradError, Result};
use crate::report::curves::{CurvePoint, PredictionRow};

use std::path::Path;

/// 导出测量值与预测值的对比表
pub fn comparison_to_csv(points: &[CurvePoint], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["theta_deg", "measured", "error", "predicted", "pull"])?;

    for p in points {
        wtr.write_record(&[
            format!("{:.4}", p.theta_deg),
            format!("{:.6e}", p.measured),
            format!("{:.6e}", p.error),
            format!("{:.6e}", p.predicted),
            format!("{:.4}", p.pull()),
        ])?;
    }

    flush(wtr, output_path)
}

/// 导出径向密度剖面
pub fn density_to_csv(profile: &[(f64, f64)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["r_fm", "rho_e_fm3"])?;

    for (r, rho) in profile {
        wtr.write_record(&[format!("{:.4}", r), format!("{:.6e}", rho)])?;
    }

    flush(wtr, output_path)
}

/// 导出逐角度预测表
pub fn prediction_to_csv(rows: &[PredictionRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["theta_deg", "rutherford", "mott", "form_factor", "experiment"])?;

    for row in rows {
        wtr.write_record(&[
            format!("{:.4}", row.theta_deg),
            format!("{:.6e}", row.rutherford),
            format!("{:.6e}", row.mott),
            format!("{:.6e}", row.form_factor),
            format!("{:.6e}", row.experiment),
        ])?;
    }

    flush(wtr, output_path)
}

fn flush(mut wtr: csv::Writer<std::fs::File>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| NucradError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}
