//! # 电荷密度参数拟合
//!
//! 最小化 χ²(X) = Σᵢ ((σ_model(θᵢ, X)·scale - σᵢ) / δᵢ)²，
//! 约束 Q(X) = Z（总电荷等于质子数），X 在核单位的盒约束内。
//!
//! 目标函数和约束都在内部把核单位参数换算为 SI，
//! 两者共用 `NuclearParams::to_si`，保证换算一致。
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 调用
//! - 使用 `physics/cross_section.rs` 计算模型截面
//! - 使用 `fit/solver.rs` 求解约束最小二乘

use crate::error::Result;
use crate::fit::config::FitConfig;
use crate::fit::solver::{ConstrainedLeastSquares, Point};
use crate::models::{FitResult, NuclearParams, ScatteringData};
use crate::physics::cross_section::ScatteringModel;

use tracing::{info, instrument, warn};

/// 参数拟合器
pub struct ParameterFitter {
    model: ScatteringModel,
    config: FitConfig,
}

impl ParameterFitter {
    pub fn new(model: ScatteringModel, config: FitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn model(&self) -> &ScatteringModel {
        &self.model
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// 归一化残差 (σ_model - σᵢ) / δᵢ
    pub fn residuals(&self, x: &NuclearParams, data: &ScatteringData) -> Result<Vec<f64>> {
        let predicted = self
            .model
            .experiment_curve_mb(&data.angles(), &x.to_si())?;

        Ok(data
            .records()
            .iter()
            .zip(predicted)
            .map(|(m, p)| (p - m.cross_section) / m.error)
            .collect())
    }

    /// χ² 目标函数
    pub fn objective(&self, x: &NuclearParams, data: &ScatteringData) -> Result<f64> {
        Ok(self.residuals(x, data)?.iter().map(|r| r * r).sum())
    }

    /// 电荷约束 Z - Q(X)，单位 e
    pub fn charge_condition(&self, x: &NuclearParams) -> f64 {
        self.model.target().z as f64 - self.model.density(&x.to_si()).total_charge()
    }

    /// 拟合电荷密度参数
    #[instrument(skip_all, name = "charge_density_fit", fields(points = data.len(), z = self.model.target().z))]
    pub fn fit(&self, data: &ScatteringData) -> Result<FitResult> {
        let start = self.config.start();
        let initial = NuclearParams::from_array(self.config.initial_guess)?;
        if !self.config.bounds.contains(&initial) {
            warn!(
                "Initial guess {:?} lies outside the bounds, starting from {:?}",
                self.config.initial_guess, start
            );
        }

        let solver = ConstrainedLeastSquares::new(
            |p: &Point| -> Result<Vec<f64>> { self.residuals(&to_params(p)?, data) },
            |p: &Point| -> Result<f64> { Ok(self.charge_condition(&to_params(p)?)) },
            Point::from(self.config.bounds.lower()),
            Point::from(self.config.bounds.upper()),
            self.config.solver,
        );

        let report = solver.minimize(Point::from(start))?;
        let params = to_params(&report.x)?;
        let objective = self.objective(&params, data)?;

        let density = self.model.density(&params.to_si());
        let total_charge = density.total_charge();
        let rms_radius = density.rms_radius(self.model.target().z)?;

        info!(
            iterations = report.iterations,
            outer_iterations = report.outer_iterations,
            chi_square = objective,
            constraint = report.constraint,
            "Fit converged: {}",
            params
        );

        Ok(FitResult {
            params,
            objective,
            constraint_residual: report.constraint,
            total_charge,
            rms_radius,
            iterations: report.iterations,
            outer_iterations: report.outer_iterations,
        })
    }
}

fn to_params(p: &Point) -> Result<NuclearParams> {
    NuclearParams::new(p[0], p[1], p[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NucradError;
    use crate::models::{Measurement, NuclearTarget, ParameterBounds};
    use crate::physics::density::{ChargeDensity, IntegrationConfig};
    use crate::physics::constants::FEMTOMETRE;

    fn calcium_model() -> ScatteringModel {
        let target = NuclearTarget::from_mev(20, 250.0).unwrap();
        ScatteringModel::new(target, IntegrationConfig::default())
    }

    /// 给定 a、b，ρ₀ 由 Q = 20 确定
    fn normalised_params(a: f64, b: f64) -> NuclearParams {
        let unit = NuclearParams::new(1.0, a, b).unwrap();
        let charge_per_rho0 =
            ChargeDensity::new(unit.to_si(), IntegrationConfig::default()).total_charge();
        NuclearParams::new(20.0 / charge_per_rho0, a, b).unwrap()
    }

    fn known_params() -> NuclearParams {
        normalised_params(3.8, 0.5)
    }

    fn synthetic_data(model: &ScatteringModel, x: &NuclearParams) -> ScatteringData {
        synthetic_data_over(model, x, (16..=36).step_by(2))
    }

    fn synthetic_data_over(
        model: &ScatteringModel,
        x: &NuclearParams,
        degrees: impl Iterator<Item = u32>,
    ) -> ScatteringData {
        let records = degrees
            .map(|deg| {
                let theta = (deg as f64).to_radians();
                let sigma = model.experiment_mb(theta, &x.to_si()).unwrap();
                Measurement::new(theta, sigma, 0.05 * sigma).unwrap()
            })
            .collect();
        ScatteringData::new("synthetic", records).unwrap()
    }

    #[test]
    fn test_known_params_satisfy_constraint() {
        let model = calcium_model();
        let x = known_params();
        assert!(ParameterBounds::default().contains(&x), "{}", x);

        let fitter = ParameterFitter::new(model, FitConfig::default()).unwrap();
        assert!(fitter.charge_condition(&x).abs() < 1e-9);

        let data = synthetic_data(&model, &x);
        assert!(fitter.objective(&x, &data).unwrap() < 1e-20);
    }

    fn assert_recovers(model: ScatteringModel, truth: NuclearParams, data: &ScatteringData) {
        let fitter = ParameterFitter::new(model, FitConfig::default()).unwrap();
        let result = fitter.fit(data).unwrap();

        let fitted = result.params;
        assert!(
            (fitted.rho0() - truth.rho0()).abs() < 1e-4,
            "rho0 {} vs {}",
            fitted.rho0(),
            truth.rho0()
        );
        assert!((fitted.a() - truth.a()).abs() < 2e-2, "a {} vs {}", fitted.a(), truth.a());
        assert!((fitted.b() - truth.b()).abs() < 2e-2, "b {} vs {}", fitted.b(), truth.b());

        assert!(result.constraint_residual.abs() <= 1e-6);
        assert!((result.total_charge - 20.0).abs() < 1e-5);
        assert!(result.objective < 1e-3, "chi square {}", result.objective);

        let expected_rms = model
            .density(&truth.to_si())
            .rms_radius(20)
            .unwrap();
        assert!(((result.rms_radius - expected_rms) / expected_rms).abs() < 1e-3);
        assert!(result.rms_radius_fm() > 3.0 && result.rms_radius / FEMTOMETRE < 4.0);
    }

    #[test]
    fn test_fit_recovers_synthetic_parameters() {
        let model = calcium_model();
        let truth = known_params();
        let data = synthetic_data(&model, &truth);
        assert_recovers(model, truth, &data);
    }

    #[test]
    fn test_fit_recovers_parameters_across_diffraction_minimum() {
        let model = calcium_model();
        let truth = normalised_params(3.95, 0.6);
        assert!(ParameterBounds::default().contains(&truth), "{}", truth);

        let data = synthetic_data_over(&model, &truth, (10..=60).step_by(5));
        assert_recovers(model, truth, &data);
    }

    #[test]
    fn test_fit_reports_non_convergence() {
        let model = calcium_model();
        let data = synthetic_data(&model, &known_params());

        let config = FitConfig::default().with_max_iterations(1);
        let fitter = ParameterFitter::new(model, config).unwrap();
        let err = fitter.fit(&data).unwrap_err();
        assert!(matches!(err, NucradError::FitDidNotConverge { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FitConfig {
            bounds: ParameterBounds {
                b: (0.0, 0.7),
                ..ParameterBounds::default()
            },
            ..FitConfig::default()
        };
        assert!(ParameterFitter::new(calcium_model(), config).is_err());
    }
}
