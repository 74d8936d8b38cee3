//! # 拟合结果数据模型
//!
//! 拟合收敛后一次性创建，之后不再修改。
//!
//! ## 依赖关系
//! - 由 `fit/fitter.rs` 创建
//! - 被 `commands/fit.rs`、`report/` 使用

use crate::models::NuclearParams;
use crate::physics::constants::FEMTOMETRE;

/// 电荷密度拟合结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// 收敛参数（核单位）
    pub params: NuclearParams,
    /// χ² 目标函数值
    pub objective: f64,
    /// 电荷约束残差 Z - Q (单位 e)
    pub constraint_residual: f64,
    /// 总电荷 (单位 e)
    pub total_charge: f64,
    /// rms 电荷半径 (m)
    pub rms_radius: f64,
    /// LM 迭代次数
    pub iterations: usize,
    /// 乘子更新次数
    pub outer_iterations: usize,
}

impl FitResult {
    /// rms 半径 (fm)
    pub fn rms_radius_fm(&self) -> f64 {
        self.rms_radius / FEMTOMETRE
    }

    /// 约化 χ²：三个参数减去一个等式约束，自由度为 n - 2
    pub fn reduced_chi_square(&self, n_points: usize) -> Option<f64> {
        if n_points > 2 {
            Some(self.objective / (n_points - 2) as f64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_chi_square() {
        let result = FitResult {
            params: NuclearParams::new(0.07, 3.8, 0.5).unwrap(),
            objective: 40.0,
            constraint_residual: 0.0,
            total_charge: 20.0,
            rms_radius: 3.48e-15,
            iterations: 12,
            outer_iterations: 3,
        };
        assert_eq!(result.reduced_chi_square(22), Some(2.0));
        assert_eq!(result.reduced_chi_square(2), None);
        assert!((result.rms_radius_fm() - 3.48).abs() < 1e-9);
    }
}
