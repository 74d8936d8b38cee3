//! # 弹性电子散射截面模型
//!
//! 三层递进的微分截面 (SI, m²/sr)：
//! 1. Rutherford: (Z·α·ħc / (2β·E·sin²(θ/2)))²
//! 2. Mott: Rutherford · (1 - β²·sin²(θ/2))
//! 3. 实验截面: Mott · |F(q)|²
//!
//! 形状因子 F(q) = 4πħ/(Z·e·q) · ∫ r·ρ(r)·sin(q·r/ħ) dr，
//! 其中动量转移 q = 2p·sin(θ/2)。q → 0 是可去奇点，
//! 小 q 时改用级数 sin(x)/x ≈ 1 - x²/6，极限为 Q/Z。
//!
//! 角度序列上的求值逐点独立，使用 rayon 并行，结果保持输入顺序。
//!
//! ## 依赖关系
//! - 被 `fit/fitter.rs` 和 `commands/` 调用
//! - 使用 `physics/density.rs` 计算电荷积分
//! - 使用 `physics/kinematics.rs` 计算 β 和 p

use crate::error::{NucradError, Result};
use crate::models::{NuclearTarget, SiParams};
use crate::physics::constants::{
    ELECTRON_MASS, FINE_STRUCTURE, HBAR, SPEED_OF_LIGHT, SQUARE_METRE_TO_MILLIBARN,
};
use crate::physics::density::{ChargeDensity, IntegrationConfig};
use crate::physics::kinematics;

use rayon::prelude::*;
use std::f64::consts::PI;

/// q·R/ħ 低于此值时使用形状因子的小 q 级数
pub const SMALL_Q_LIMIT: f64 = 1e-4;

/// 截面模型：靶核参数 + 径向积分设置
#[derive(Debug, Clone, Copy)]
pub struct ScatteringModel {
    target: NuclearTarget,
    integration: IntegrationConfig,
}

impl ScatteringModel {
    pub fn new(target: NuclearTarget, integration: IntegrationConfig) -> Self {
        Self {
            target,
            integration,
        }
    }

    pub fn target(&self) -> &NuclearTarget {
        &self.target
    }

    /// 给定参数的电荷分布
    pub fn density(&self, x: &SiParams) -> ChargeDensity {
        ChargeDensity::new(*x, self.integration)
    }

    /// 入射电子 β = v/c
    pub fn beta(&self) -> Result<f64> {
        kinematics::beta(self.target.energy, ELECTRON_MASS)
    }

    /// Rutherford 截面 (m²/sr)
    pub fn rutherford(&self, theta: f64) -> Result<f64> {
        let beta = self.beta()?;
        if beta == 0.0 {
            return Err(NucradError::singular(
                "projectile at rest: Rutherford cross section diverges",
            ));
        }
        let s = half_angle_sin(theta)?;
        if s == 0.0 {
            return Err(NucradError::singular(format!(
                "Rutherford cross section diverges at theta = {}",
                theta
            )));
        }

        let z = self.target.z as f64;
        let amplitude = z * FINE_STRUCTURE * HBAR * SPEED_OF_LIGHT
            / (2.0 * beta * self.target.energy * s * s);
        finite(amplitude * amplitude, "Rutherford cross section", theta)
    }

    /// Mott 截面 (m²/sr)
    pub fn mott(&self, theta: f64) -> Result<f64> {
        let beta = self.beta()?;
        let s = half_angle_sin(theta)?;
        Ok(self.rutherford(theta)? * (1.0 - beta * beta * s * s))
    }

    /// 动量转移 q = 2p·|sin(θ/2)| (kg·m/s)
    pub fn momentum_transfer(&self, theta: f64) -> Result<f64> {
        let p = kinematics::momentum(self.target.energy, ELECTRON_MASS)?;
        Ok(2.0 * p * half_angle_sin(theta)?.abs())
    }

    /// 散射角 θ 处的形状因子
    pub fn form_factor(&self, theta: f64, x: &SiParams) -> Result<f64> {
        let q = self.momentum_transfer(theta)?;
        self.form_factor_at(q, x)
    }

    /// 动量转移 q 处的形状因子
    pub fn form_factor_at(&self, q: f64, x: &SiParams) -> Result<f64> {
        if !q.is_finite() || q < 0.0 {
            return Err(NucradError::singular(format!(
                "momentum transfer must be finite and non-negative, got {}",
                q
            )));
        }

        let density = self.density(x);
        let k = q / HBAR;
        let norm = 4.0 * PI / self.target.charge();

        let f = if k * density.cutoff_radius() < SMALL_Q_LIMIT {
            let zeroth = density.integrate_charge(2, |_| 1.0);
            let second = density.integrate_charge(4, |_| 1.0);
            norm * (zeroth - k * k / 6.0 * second)
        } else {
            norm / k * density.form_factor_integral(q)
        };

        if !f.is_finite() {
            return Err(NucradError::singular(format!(
                "form factor is not finite at q = {:e}",
                q
            )));
        }
        Ok(f)
    }

    /// 实验微分截面 Mott·|F|² (m²/sr)
    pub fn experiment(&self, theta: f64, x: &SiParams) -> Result<f64> {
        let f = self.form_factor(theta, x)?;
        Ok(self.mott(theta)? * f * f)
    }

    /// 实验微分截面，换算为数据文件使用的 mb/sr
    pub fn experiment_mb(&self, theta: f64, x: &SiParams) -> Result<f64> {
        Ok(self.experiment(theta, x)? * SQUARE_METRE_TO_MILLIBARN)
    }

    /// 逐角度 Rutherford 截面
    pub fn rutherford_curve(&self, thetas: &[f64]) -> Result<Vec<f64>> {
        broadcast(thetas, |t| self.rutherford(t))
    }

    /// 逐角度 Mott 截面
    pub fn mott_curve(&self, thetas: &[f64]) -> Result<Vec<f64>> {
        broadcast(thetas, |t| self.mott(t))
    }

    /// 逐角度形状因子
    pub fn form_factor_curve(&self, thetas: &[f64], x: &SiParams) -> Result<Vec<f64>> {
        broadcast(thetas, |t| self.form_factor(t, x))
    }

    /// 逐角度实验截面 (m²/sr)
    pub fn experiment_curve(&self, thetas: &[f64], x: &SiParams) -> Result<Vec<f64>> {
        broadcast(thetas, |t| self.experiment(t, x))
    }

    /// 逐角度实验截面 (mb/sr)
    pub fn experiment_curve_mb(&self, thetas: &[f64], x: &SiParams) -> Result<Vec<f64>> {
        broadcast(thetas, |t| self.experiment_mb(t, x))
    }
}

/// 对每个角度独立求值，保持输入顺序
fn broadcast<F>(thetas: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(f64) -> Result<f64> + Sync + Send,
{
    thetas.par_iter().map(|&theta| f(theta)).collect()
}

/// sin(θ/2)，拒绝非有限角度
fn half_angle_sin(theta: f64) -> Result<f64> {
    if !theta.is_finite() {
        return Err(NucradError::singular(format!(
            "scattering angle must be finite, got {}",
            theta
        )));
    }
    Ok((theta / 2.0).sin())
}

fn finite(value: f64, what: &str, theta: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NucradError::singular(format!(
            "{} overflows at theta = {}",
            what, theta
        )))
    }
}
