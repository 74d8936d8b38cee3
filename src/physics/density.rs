//! # 核电荷密度模型
//!
//! 球对称 Fermi 型电荷分布及其径向加权积分。
//!
//! ## 公式
//! ρ(r) = ρ₀ / (1 + exp((r - a)/b))
//!
//! 所有导出量都由同一个积分原语得到：
//! I(n, w) = ∫₀^R rⁿ ρ(r) w(r) dr，R = k·b + a（默认 k = 5），
//! 在 [0, R] 上等距取 N 个点（默认 1000），梯形法则求积。
//!
//! - 总电荷 Q = 4π/e · I(2, 1)，单位 e
//! - rms 半径 = sqrt(4π/(Z·e) · I(4, 1))
//! - 形状因子积分 = I(1, sin(q·r/ħ))
//!
//! ## 依赖关系
//! - 被 `physics/cross_section.rs`、`fit/fitter.rs` 调用
//! - 使用 `models/params.rs` 的 SiParams

use crate::error::{NucradError, Result};
use crate::models::SiParams;
use crate::physics::constants::{ELEMENTARY_CHARGE, HBAR};

use std::f64::consts::PI;

/// 默认积分采样点数
pub const DEFAULT_SAMPLES: usize = 1000;

/// 默认截断半径：a 之外多少个 b
pub const DEFAULT_CUTOFF_WIDTHS: f64 = 5.0;

/// 径向积分设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationConfig {
    /// 等距采样点数 N
    pub samples: usize,
    /// 截断半径 R = cutoff_widths·b + a
    pub cutoff_widths: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            samples: DEFAULT_SAMPLES,
            cutoff_widths: DEFAULT_CUTOFF_WIDTHS,
        }
    }
}

impl IntegrationConfig {
    pub fn new(samples: usize, cutoff_widths: f64) -> Result<Self> {
        if samples == 0 {
            return Err(NucradError::InvalidArgument(
                "integration needs at least one sample".to_string(),
            ));
        }
        if !cutoff_widths.is_finite() || cutoff_widths <= 0.0 {
            return Err(NucradError::InvalidArgument(format!(
                "cutoff multiplier must be positive, got {}",
                cutoff_widths
            )));
        }
        Ok(IntegrationConfig {
            samples,
            cutoff_widths,
        })
    }
}

/// Fermi 型电荷密度 ρ(r)，r 单位 m，返回 C/m³
pub fn charge_density(r: f64, x: &SiParams) -> f64 {
    x.rho0() / (1.0 + ((r - x.a()) / x.b()).exp())
}

/// 给定参数和积分设置的电荷分布
#[derive(Debug, Clone, Copy)]
pub struct ChargeDensity {
    params: SiParams,
    config: IntegrationConfig,
}

impl ChargeDensity {
    pub fn new(params: SiParams, config: IntegrationConfig) -> Self {
        Self { params, config }
    }

    /// ρ(r)，r 单位 m
    pub fn density(&self, r: f64) -> f64 {
        charge_density(r, &self.params)
    }

    /// 积分截断半径 (m)
    pub fn cutoff_radius(&self) -> f64 {
        self.config.cutoff_widths * self.params.b() + self.params.a()
    }

    /// ∫₀^R r^power · ρ(r) · weight(r) dr（梯形法则）
    ///
    /// 只有一个采样点时积分区间退化，结果为 0。
    pub fn integrate_charge<W>(&self, power: i32, weight: W) -> f64
    where
        W: Fn(f64) -> f64,
    {
        let n = self.config.samples;
        if n < 2 {
            return 0.0;
        }

        let r_max = self.cutoff_radius();
        let h = r_max / (n - 1) as f64;
        let f = |i: usize| {
            let r = i as f64 * h;
            r.powi(power) * self.density(r) * weight(r)
        };

        let interior: f64 = (1..n - 1).map(f).sum();
        h * (0.5 * (f(0) + f(n - 1)) + interior)
    }

    /// 总电荷（单位 e）
    pub fn total_charge(&self) -> f64 {
        4.0 * PI / ELEMENTARY_CHARGE * self.integrate_charge(2, |_| 1.0)
    }

    /// rms 电荷半径 (m)
    pub fn rms_radius(&self, z: u32) -> Result<f64> {
        if z == 0 {
            return Err(NucradError::invalid_params(
                "rms radius needs a non-zero proton number",
            ));
        }
        let factor = 4.0 * PI / (z as f64 * ELEMENTARY_CHARGE);
        let mean_square = factor * self.integrate_charge(4, |_| 1.0);
        if !mean_square.is_finite() || mean_square < 0.0 {
            return Err(NucradError::invalid_params(format!(
                "mean square radius is not a finite non-negative number: {}",
                mean_square
            )));
        }
        Ok(mean_square.sqrt())
    }

    /// 形状因子积分 ∫ r·ρ(r)·sin(q·r/ħ) dr，q 单位 kg·m/s
    pub fn form_factor_integral(&self, q: f64) -> f64 {
        let k = q / HBAR;
        self.integrate_charge(1, |r| (k * r).sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NuclearParams;
    use crate::physics::constants::FEMTOMETRE;

    fn calcium_like() -> SiParams {
        NuclearParams::new(0.0743, 3.8, 0.5).unwrap().to_si()
    }

    fn with_samples(samples: usize) -> IntegrationConfig {
        IntegrationConfig::new(samples, DEFAULT_CUTOFF_WIDTHS).unwrap()
    }

    #[test]
    fn test_half_density_at_a() {
        let x = calcium_like();
        assert_eq!(charge_density(x.a(), &x), x.rho0() / 2.0);
    }

    #[test]
    fn test_density_strictly_decreasing() {
        let x = calcium_like();
        let mut previous = charge_density(0.0, &x);
        assert!(previous <= x.rho0());
        for i in 1..400 {
            let r = i as f64 * 0.02 * FEMTOMETRE;
            let rho = charge_density(r, &x);
            assert!(rho < previous, "density not decreasing at r = {} fm", i as f64 * 0.02);
            assert!(rho > 0.0);
            previous = rho;
        }
    }

    #[test]
    fn test_total_charge_increases_with_rho0() {
        let config = IntegrationConfig::default();
        let mut previous = 0.0;
        for rho0 in [0.05, 0.06, 0.07, 0.08, 0.09] {
            let x = NuclearParams::new(rho0, 4.0, 0.5).unwrap().to_si();
            let q = ChargeDensity::new(x, config).total_charge();
            assert!(q > previous, "Q({}) = {} not above {}", rho0, q, previous);
            previous = q;
        }
    }

    #[test]
    fn test_sharp_surface_limit() {
        let a = 4.0;
        let rho0 = 20.0 / (4.0 / 3.0 * PI * a * a * a);
        let x = NuclearParams::new(rho0, a, 0.01).unwrap().to_si();
        let density = ChargeDensity::new(x, with_samples(10_000));

        let q = density.total_charge();
        assert!((q - 20.0).abs() < 0.2, "uniform sphere should hold 20 e, got {}", q);

        let rms_fm = density.rms_radius(20).unwrap() / FEMTOMETRE;
        let expected = (3.0_f64 / 5.0).sqrt() * a;
        assert!(
            (rms_fm - expected).abs() / expected < 0.01,
            "rms radius {} fm, expected {} fm",
            rms_fm,
            expected
        );
    }

    #[test]
    fn test_trapezoid_resolution_convergence() {
        let x = calcium_like();
        let charge = |n| ChargeDensity::new(x, with_samples(n)).total_charge();
        let fine = charge(10_000);
        let diff = |n| (charge(n) - fine).abs() / fine;

        // 单个采样点时积分为 0
        assert_eq!(charge(1), 0.0);
        assert_eq!(diff(1), 1.0);

        let (d10, d100, d1000) = (diff(10), diff(100), diff(1000));
        assert!(d10 > d100, "N=10 differs by {}, N=100 by {}", d10, d100);
        assert!(d100 > d1000, "N=100 differs by {}, N=1000 by {}", d100, d1000);
        assert!(d100 < 1e-3, "N=100 differs by {}", d100);
        assert!(d1000 < 1e-5, "N=1000 differs by {}", d1000);
    }

    #[test]
    fn test_form_factor_integral_small_q() {
        // sin(kr) ≈ kr，积分趋于 k · ∫ r²ρ dr
        let density = ChargeDensity::new(calcium_like(), IntegrationConfig::default());
        let k = 1e9;
        let integral = density.form_factor_integral(k * HBAR);
        let expected = k * density.integrate_charge(2, |_| 1.0);
        assert!(((integral - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(IntegrationConfig::new(0, 5.0).is_err());
        assert!(IntegrationConfig::new(100, -1.0).is_err());
        assert!(NuclearParams::new(1.0, 1.0, -1.0).is_err());

        let density = ChargeDensity::new(calcium_like(), IntegrationConfig::default());
        assert!(density.rms_radius(0).is_err());
    }
}
