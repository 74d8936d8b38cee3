//! # 相对论运动学
//!
//! 入射粒子的相对论速度与动量，均为总能量 E (J) 与静止质量 m (kg) 的纯函数。
//!
//! ## 公式
//! - v = c·sqrt(1 - (mc²/E)²)
//! - p = sqrt(E² - (mc²)²) / c
//!
//! 只在 E ≥ mc² 时有定义。
//!
//! ## 依赖关系
//! - 被 `physics/cross_section.rs` 调用
//! - 使用 `physics/constants.rs` 的光速

use crate::error::{NucradError, Result};
use crate::physics::constants::SPEED_OF_LIGHT;

/// 校验能量和质量，返回静止能量 mc²
fn rest_energy(energy: f64, mass: f64) -> Result<f64> {
    if !mass.is_finite() || mass < 0.0 {
        return Err(NucradError::invalid_params(format!(
            "rest mass must be non-negative, got {} kg",
            mass
        )));
    }
    let rest = mass * SPEED_OF_LIGHT * SPEED_OF_LIGHT;
    if !energy.is_finite() || energy <= 0.0 || energy < rest {
        return Err(NucradError::KinematicDomainError {
            energy,
            rest_energy: rest,
        });
    }
    Ok(rest)
}

/// 相对论速度 (m/s)
pub fn velocity(energy: f64, mass: f64) -> Result<f64> {
    let rest = rest_energy(energy, mass)?;
    let ratio = rest / energy;
    Ok(SPEED_OF_LIGHT * (1.0 - ratio * ratio).sqrt())
}

/// 相对论动量 (kg·m/s)
pub fn momentum(energy: f64, mass: f64) -> Result<f64> {
    let rest = rest_energy(energy, mass)?;
    Ok((energy * energy - rest * rest).sqrt() / SPEED_OF_LIGHT)
}

/// β = v/c
pub fn beta(energy: f64, mass: f64) -> Result<f64> {
    Ok(velocity(energy, mass)? / SPEED_OF_LIGHT)
}
