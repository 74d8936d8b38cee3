//! # 报告数据序列
//!
//! 从模型和拟合参数生成导出与绘图共用的数据序列：
//! - 测量点与模型预测的逐点对比
//! - 平滑截面曲线
//! - 径向电荷密度剖面（fm, e/fm³）
//! - 逐角度预测表（Rutherford / Mott / F / 实验截面）
//!
//! ## 依赖关系
//! - 被 `report/export.rs`、`report/plot.rs` 和 `commands/` 使用
//! - 使用 `physics/cross_section.rs`

use crate::error::{NucradError, Result};
use crate::models::{NuclearParams, ScatteringData};
use crate::physics::constants::{ELEMENTARY_CHARGE, FEMTOMETRE, SQUARE_METRE_TO_MILLIBARN};
use crate::physics::{ChargeDensity, ScatteringModel};

/// 平滑曲线默认采样数
pub const CURVE_POINTS: usize = 200;

/// 测量点与预测值的对比
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub theta_deg: f64,
    pub measured: f64,
    pub error: f64,
    pub predicted: f64,
}

impl CurvePoint {
    /// 归一化残差 (predicted - measured) / error
    pub fn pull(&self) -> f64 {
        (self.predicted - self.measured) / self.error
    }
}

/// 逐角度预测
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow {
    pub theta_deg: f64,
    /// mb/sr
    pub rutherford: f64,
    /// mb/sr
    pub mott: f64,
    pub form_factor: f64,
    /// mb/sr
    pub experiment: f64,
}

/// 每个测量角度上的预测值
pub fn compare_with_data(
    model: &ScatteringModel,
    data: &ScatteringData,
    x: &NuclearParams,
) -> Result<Vec<CurvePoint>> {
    let predicted = model.experiment_curve_mb(&data.angles(), &x.to_si())?;
    Ok(data
        .records()
        .iter()
        .zip(predicted)
        .map(|(m, p)| CurvePoint {
            theta_deg: m.theta_degrees(),
            measured: m.cross_section,
            error: m.error,
            predicted: p,
        })
        .collect())
}

/// [start, end] 上等距的 n 个角度（度）
pub fn angle_grid(start_deg: f64, end_deg: f64, n: usize) -> Result<Vec<f64>> {
    if !(start_deg > 0.0 && end_deg <= 180.0 && start_deg <= end_deg) {
        return Err(NucradError::InvalidRange(format!(
            "{}-{} degrees (must satisfy 0 < start <= end <= 180)",
            start_deg, end_deg
        )));
    }
    if n == 0 {
        return Err(NucradError::InvalidArgument(
            "angle grid needs at least one point".to_string(),
        ));
    }
    if n == 1 {
        return Ok(vec![start_deg]);
    }

    let step = (end_deg - start_deg) / (n - 1) as f64;
    Ok((0..n).map(|i| start_deg + i as f64 * step).collect())
}

/// 角度网格上的实验截面 (θ°, mb/sr)
pub fn cross_section_curve(
    model: &ScatteringModel,
    x: &NuclearParams,
    angles_deg: &[f64],
) -> Result<Vec<(f64, f64)>> {
    let radians: Vec<f64> = angles_deg.iter().map(|d| d.to_radians()).collect();
    let sigma = model.experiment_curve_mb(&radians, &x.to_si())?;
    Ok(angles_deg.iter().copied().zip(sigma).collect())
}

/// 径向密度剖面 (r fm, ρ e/fm³)，r 从 0 到 r_max_fm
pub fn density_profile(density: &ChargeDensity, r_max_fm: f64, n: usize) -> Vec<(f64, f64)> {
    if n < 2 {
        return vec![(0.0, density.density(0.0) * charge_per_fm3())];
    }

    let step = r_max_fm / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let r_fm = i as f64 * step;
            (r_fm, density.density(r_fm * FEMTOMETRE) * charge_per_fm3())
        })
        .collect()
}

/// C/m³ 到 e/fm³ 的换算因子
fn charge_per_fm3() -> f64 {
    FEMTOMETRE.powi(3) / ELEMENTARY_CHARGE
}

/// 逐角度预测表
pub fn prediction_table(
    model: &ScatteringModel,
    x: &NuclearParams,
    angles_deg: &[f64],
) -> Result<Vec<PredictionRow>> {
    let radians: Vec<f64> = angles_deg.iter().map(|d| d.to_radians()).collect();
    let si = x.to_si();

    let rutherford = model.rutherford_curve(&radians)?;
    let mott = model.mott_curve(&radians)?;
    let form_factor = model.form_factor_curve(&radians, &si)?;

    Ok(angles_deg
        .iter()
        .zip(rutherford)
        .zip(mott)
        .zip(form_factor)
        .map(|(((&theta_deg, r), m), f)| PredictionRow {
            theta_deg,
            rutherford: r * SQUARE_METRE_TO_MILLIBARN,
            mott: m * SQUARE_METRE_TO_MILLIBARN,
            form_factor: f,
            experiment: m * f * f * SQUARE_METRE_TO_MILLIBARN,
        })
        .collect())
}
