//! # 散射测量数据模型
//!
//! 存储弹性电子散射的测量记录和靶核参数。
//!
//! ## 依赖关系
//! - 被 `parsers/scattering_csv.rs` 创建
//! - 被 `fit/fitter.rs`、`physics/cross_section.rs` 使用

use crate::error::{NucradError, Result};
use crate::physics::constants::{ELEMENTARY_CHARGE, MEV_TO_JOULE};

/// 单条测量记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// 散射角（弧度）
    pub theta: f64,
    /// 微分截面 (mb/sr)
    pub cross_section: f64,
    /// 测量误差 (mb/sr)
    pub error: f64,
}

impl Measurement {
    /// 创建并校验测量记录
    pub fn new(theta: f64, cross_section: f64, error: f64) -> Result<Self> {
        if !theta.is_finite() || theta <= 0.0 || theta > std::f64::consts::PI {
            return Err(NucradError::InvalidData(format!(
                "scattering angle must lie in (0, pi] rad, got {}",
                theta
            )));
        }
        if !cross_section.is_finite() {
            return Err(NucradError::InvalidData(format!(
                "cross section must be finite, got {}",
                cross_section
            )));
        }
        if !error.is_finite() || error <= 0.0 {
            return Err(NucradError::InvalidData(format!(
                "measurement error must be positive, got {}",
                error
            )));
        }
        Ok(Measurement {
            theta,
            cross_section,
            error,
        })
    }

    /// 散射角（度）
    pub fn theta_degrees(&self) -> f64 {
        self.theta.to_degrees()
    }
}

/// 一组测量数据，加载后不可变
#[derive(Debug, Clone)]
pub struct ScatteringData {
    /// 数据集名称（通常为文件名）
    pub name: String,
    records: Vec<Measurement>,
}

impl ScatteringData {
    pub fn new(name: impl Into<String>, records: Vec<Measurement>) -> Result<Self> {
        if records.is_empty() {
            return Err(NucradError::InvalidData(
                "dataset contains no measurements".to_string(),
            ));
        }
        Ok(ScatteringData {
            name: name.into(),
            records,
        })
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 所有散射角（弧度）
    pub fn angles(&self) -> Vec<f64> {
        self.records.iter().map(|m| m.theta).collect()
    }

    /// 最小和最大散射角（弧度）
    pub fn angle_range(&self) -> (f64, f64) {
        self.records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
                (lo.min(m.theta), hi.max(m.theta))
            })
    }
}

/// 靶核与入射电子参数，单次拟合中保持不变
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NuclearTarget {
    /// 质子数 Z
    pub z: u32,
    /// 入射电子总能量 (J)
    pub energy: f64,
}

impl NuclearTarget {
    pub fn new(z: u32, energy: f64) -> Result<Self> {
        if z == 0 {
            return Err(NucradError::InvalidArgument(
                "proton number Z must be at least 1".to_string(),
            ));
        }
        if !energy.is_finite() || energy <= 0.0 {
            return Err(NucradError::InvalidArgument(format!(
                "projectile energy must be positive, got {} J",
                energy
            )));
        }
        Ok(NuclearTarget { z, energy })
    }

    /// 由 MeV 能量创建
    pub fn from_mev(z: u32, energy_mev: f64) -> Result<Self> {
        Self::new(z, energy_mev * MEV_TO_JOULE)
    }

    /// 核电荷 Z·e (C)
    pub fn charge(&self) -> f64 {
        self.z as f64 * ELEMENTARY_CHARGE
    }

    pub fn energy_mev(&self) -> f64 {
        self.energy / MEV_TO_JOULE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_validation() {
        assert!(Measurement::new(0.5, 10.0, 0.1).is_ok());
        assert!(Measurement::new(0.0, 10.0, 0.1).is_err());
        assert!(Measurement::new(0.5, 10.0, 0.0).is_err());
        assert!(Measurement::new(0.5, f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(ScatteringData::new("empty", vec![]).is_err());
    }

    #[test]
    fn test_angle_range() {
        let data = ScatteringData::new(
            "three",
            vec![
                Measurement::new(0.6, 1.0, 0.1).unwrap(),
                Measurement::new(0.2, 5.0, 0.1).unwrap(),
                Measurement::new(0.9, 0.5, 0.1).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(data.angle_range(), (0.2, 0.9));
        assert_eq!(data.angles(), vec![0.6, 0.2, 0.9]);
    }

    #[test]
    fn test_target_energy_conversion() {
        let target = NuclearTarget::from_mev(20, 250.0).unwrap();
        assert!((target.energy_mev() - 250.0).abs() < 1e-9);
        assert!(NuclearTarget::new(0, 1.0).is_err());
        assert!(NuclearTarget::from_mev(20, -1.0).is_err());
    }
}
