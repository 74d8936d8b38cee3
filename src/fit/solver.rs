//! # 约束最小二乘求解器
//!
//! 求解三参数问题
//!
//! min Σ rᵢ(x)²  s.t.  c(x) = 0,  lower ≤ x ≤ upper
//!
//! ## 算法概述
//! 1. 外层：增广 Lagrange 法，乘子更新 λ ← λ + μ·c，
//!    约束违反下降不足 4 倍时罚参数 μ 乘以增长因子
//! 2. 内层：投影 Levenberg–Marquardt，罚项作为额外残差
//!    sqrt(μ/2)·(c + λ/μ) 拼接到残差向量末尾
//! 3. Jacobian 用前向差分；到达边界的坐标向内差分
//! 4. 位于边界且梯度指向外侧的变量在本步中冻结
//!
//! LM 迭代总数受 `max_iterations` 限制，外层轮数受
//! `max_outer_iterations` 限制，任一耗尽都报告未收敛。
//!
//! ## 依赖关系
//! - 被 `fit/fitter.rs` 调用
//! - 使用 `nalgebra` 求解 3×3 法方程

use crate::error::{NucradError, Result};

use nalgebra::{Matrix3, Vector3};
use tracing::{debug, trace};

/// 参数向量
pub type Point = Vector3<f64>;

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;
const DIAGONAL_FLOOR: f64 = 1e-14;

/// 求解器设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// LM 迭代总预算
    pub max_iterations: usize,
    /// 乘子更新轮数上限
    pub max_outer_iterations: usize,
    /// 代价相对下降小于此值时内层停止
    pub cost_tolerance: f64,
    /// 归一化步长小于此值时内层停止
    pub step_tolerance: f64,
    /// 归一化投影梯度小于此值时内层停止
    pub gradient_tolerance: f64,
    /// 收敛时允许的 |c|
    pub constraint_tolerance: f64,
    /// 初始罚参数 μ
    pub initial_penalty: f64,
    /// 罚参数增长因子
    pub penalty_growth: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_iterations: 500,
            max_outer_iterations: 40,
            cost_tolerance: 1e-12,
            step_tolerance: 1e-10,
            gradient_tolerance: 1e-10,
            constraint_tolerance: 1e-6,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 || self.max_outer_iterations == 0 {
            return Err(NucradError::InvalidArgument(
                "iteration limits must be at least 1".to_string(),
            ));
        }
        let positive = [
            ("cost tolerance", self.cost_tolerance),
            ("step tolerance", self.step_tolerance),
            ("gradient tolerance", self.gradient_tolerance),
            ("constraint tolerance", self.constraint_tolerance),
            ("initial penalty", self.initial_penalty),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(NucradError::InvalidArgument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !self.penalty_growth.is_finite() || self.penalty_growth <= 1.0 {
            return Err(NucradError::InvalidArgument(format!(
                "penalty growth must exceed 1, got {}",
                self.penalty_growth
            )));
        }
        Ok(())
    }
}

/// 求解结果
#[derive(Debug, Clone, Copy)]
pub struct SolverReport {
    /// 收敛点
    pub x: Point,
    /// Σ rᵢ²（不含罚项）
    pub cost: f64,
    /// 收敛点的约束值 c(x)
    pub constraint: f64,
    /// LM 迭代次数
    pub iterations: usize,
    /// 外层轮数
    pub outer_iterations: usize,
}

/// 带等式约束和盒约束的最小二乘问题
pub struct ConstrainedLeastSquares<R, C> {
    residuals: R,
    constraint: C,
    lower: Point,
    upper: Point,
    settings: SolverSettings,
}

impl<R, C> ConstrainedLeastSquares<R, C>
where
    R: Fn(&Point) -> Result<Vec<f64>>,
    C: Fn(&Point) -> Result<f64>,
{
    pub fn new(residuals: R, constraint: C, lower: Point, upper: Point, settings: SolverSettings) -> Self {
        Self {
            residuals,
            constraint,
            lower,
            upper,
            settings,
        }
    }

    /// 从 `start`（先裁剪进边界）开始求解
    pub fn minimize(&self, start: Point) -> Result<SolverReport> {
        let s = &self.settings;
        let mut x = self.clamp(&start);
        let mut multiplier = 0.0;
        let mut penalty = s.initial_penalty;
        let mut iterations = 0;
        let mut previous_violation = f64::INFINITY;
        let mut violation = f64::NAN;

        for outer in 1..=s.max_outer_iterations {
            x = self.levenberg_marquardt(x, multiplier, penalty, &mut iterations)?;
            let c = (self.constraint)(&x)?;
            violation = c;

            debug!(
                outer,
                iterations,
                constraint = c,
                penalty,
                multiplier,
                "Augmented Lagrangian round finished"
            );

            if c.abs() <= s.constraint_tolerance {
                let cost = sum_of_squares(&(self.residuals)(&x)?);
                return Ok(SolverReport {
                    x,
                    cost,
                    constraint: c,
                    iterations,
                    outer_iterations: outer,
                });
            }

            multiplier += penalty * c;
            if c.abs() > 0.25 * previous_violation {
                penalty *= s.penalty_growth;
            }
            previous_violation = c.abs();
        }

        Err(NucradError::FitDidNotConverge {
            iterations,
            constraint_residual: violation,
            reason: format!(
                "equality constraint not satisfied after {} multiplier updates",
                s.max_outer_iterations
            ),
        })
    }

    /// 残差向量 + 罚项残差
    fn augmented(&self, x: &Point, multiplier: f64, penalty: f64) -> Result<Vec<f64>> {
        let mut r = (self.residuals)(x)?;
        let c = (self.constraint)(x)?;
        r.push((0.5 * penalty).sqrt() * (c + multiplier / penalty));
        Ok(r)
    }

    /// 固定乘子和罚参数下的投影 LM
    fn levenberg_marquardt(
        &self,
        start: Point,
        multiplier: f64,
        penalty: f64,
        iterations: &mut usize,
    ) -> Result<Point> {
        let s = &self.settings;
        let mut x = start;
        let mut r = self.augmented(&x, multiplier, penalty)?;
        let mut cost = sum_of_squares(&r);
        let mut damping = INITIAL_DAMPING;

        if !cost.is_finite() {
            return Err(NucradError::singular(format!(
                "objective is not finite at the starting point {:?}",
                x.as_slice()
            )));
        }

        loop {
            if cost <= f64::MIN_POSITIVE {
                return Ok(x);
            }
            if *iterations >= s.max_iterations {
                return Err(NucradError::FitDidNotConverge {
                    iterations: *iterations,
                    constraint_residual: (self.constraint)(&x).unwrap_or(f64::NAN),
                    reason: format!("iteration budget of {} exhausted", s.max_iterations),
                });
            }
            *iterations += 1;

            let (jtj, gradient) = self.normal_equations(&x, &r, multiplier, penalty)?;
            let free = self.free_variables(&x, &gradient);

            let projected_gradient = (0..3)
                .filter(|&j| free[j])
                .map(|j| (gradient[j] * self.range(j)).abs())
                .fold(0.0, f64::max);
            if projected_gradient <= s.gradient_tolerance * cost {
                return Ok(x);
            }

            let mut accepted = false;
            while damping <= MAX_DAMPING {
                let Some(step) = solve_damped(&jtj, &gradient, damping, &free) else {
                    damping *= 10.0;
                    continue;
                };

                let candidate = self.clamp(&(x + step));
                let moved = candidate - x;
                if moved.iter().all(|v| *v == 0.0) {
                    return Ok(x);
                }

                let r_new = self.augmented(&candidate, multiplier, penalty)?;
                let cost_new = sum_of_squares(&r_new);

                if cost_new.is_finite() && cost_new < cost {
                    let decrease = cost - cost_new;
                    let small_step = self.scaled_norm(&moved)
                        <= s.step_tolerance * (self.scaled_norm(&candidate) + s.step_tolerance);

                    trace!(
                        iteration = *iterations,
                        cost = cost_new,
                        damping,
                        "LM step accepted"
                    );

                    x = candidate;
                    r = r_new;
                    damping = (damping / 10.0).max(MIN_DAMPING);

                    if decrease <= s.cost_tolerance * cost || small_step {
                        return Ok(x);
                    }
                    cost = cost_new;
                    accepted = true;
                    break;
                }

                damping *= 10.0;
            }

            // 阻尼已达上限仍无下降：当前点即为局部极小
            if !accepted {
                return Ok(x);
            }
        }
    }

    /// 前向差分 Jacobian 构成的 JᵀJ 和梯度 Jᵀr
    fn normal_equations(
        &self,
        x: &Point,
        r: &[f64],
        multiplier: f64,
        penalty: f64,
    ) -> Result<(Matrix3<f64>, Vector3<f64>)> {
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(3);

        for j in 0..3 {
            let mut h = f64::EPSILON.sqrt() * x[j].abs().max(self.range(j));
            if x[j] + h > self.upper[j] {
                h = -h;
            }
            let mut shifted = *x;
            shifted[j] += h;

            let r_shifted = self.augmented(&shifted, multiplier, penalty)?;
            columns.push(
                r_shifted
                    .iter()
                    .zip(r)
                    .map(|(a, b)| (a - b) / h)
                    .collect(),
            );
        }

        let mut jtj = Matrix3::zeros();
        let mut gradient = Vector3::zeros();
        for i in 0..3 {
            gradient[i] = columns[i].iter().zip(r).map(|(a, b)| a * b).sum();
            for k in i..3 {
                let v: f64 = columns[i].iter().zip(&columns[k]).map(|(a, b)| a * b).sum();
                jtj[(i, k)] = v;
                jtj[(k, i)] = v;
            }
        }

        if jtj.iter().chain(gradient.iter()).any(|v| !v.is_finite()) {
            return Err(NucradError::singular(format!(
                "non-finite Jacobian at {:?}",
                x.as_slice()
            )));
        }

        Ok((jtj, gradient))
    }

    /// 不在"边界且梯度指向外侧"状态的变量
    fn free_variables(&self, x: &Point, gradient: &Vector3<f64>) -> [bool; 3] {
        let mut free = [true; 3];
        for j in 0..3 {
            let pinned_low = x[j] <= self.lower[j] && gradient[j] > 0.0;
            let pinned_high = x[j] >= self.upper[j] && gradient[j] < 0.0;
            free[j] = !(pinned_low || pinned_high);
        }
        free
    }

    fn clamp(&self, x: &Point) -> Point {
        Point::new(
            x[0].clamp(self.lower[0], self.upper[0]),
            x[1].clamp(self.lower[1], self.upper[1]),
            x[2].clamp(self.lower[2], self.upper[2]),
        )
    }

    fn range(&self, j: usize) -> f64 {
        self.upper[j] - self.lower[j]
    }

    /// 按边界宽度归一化的范数
    fn scaled_norm(&self, v: &Point) -> f64 {
        (0..3)
            .map(|j| (v[j] / self.range(j)).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// 解 (JᵀJ + λ·diag(JᵀJ))·δ = -Jᵀr，冻结变量的分量为 0
fn solve_damped(
    jtj: &Matrix3<f64>,
    gradient: &Vector3<f64>,
    damping: f64,
    free: &[bool; 3],
) -> Option<Vector3<f64>> {
    let max_diagonal = jtj.diagonal().max();
    let floor = (DIAGONAL_FLOOR * max_diagonal).max(f64::MIN_POSITIVE);

    let mut a = *jtj;
    let mut rhs = -gradient;
    for j in 0..3 {
        if free[j] {
            a[(j, j)] += damping * jtj[(j, j)].max(floor);
        } else {
            for k in 0..3 {
                a[(j, k)] = 0.0;
                a[(k, j)] = 0.0;
            }
            a[(j, j)] = 1.0;
            rhs[j] = 0.0;
        }
    }

    let step = a.cholesky()?.solve(&rhs);
    if step.iter().all(|v| v.is_finite()) {
        Some(step)
    } else {
        None
    }
}

fn sum_of_squares(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 到 (1, 2, 3) 的距离平方，约束 x₀ + x₁ + x₂ = 3
    fn plane_problem(
        upper_z: f64,
        settings: SolverSettings,
    ) -> ConstrainedLeastSquares<
        impl Fn(&Point) -> Result<Vec<f64>>,
        impl Fn(&Point) -> Result<f64>,
    > {
        ConstrainedLeastSquares::new(
            |x: &Point| Ok(vec![x[0] - 1.0, x[1] - 2.0, x[2] - 3.0]),
            |x: &Point| Ok(3.0 - x.sum()),
            Point::new(-10.0, -10.0, -10.0),
            Point::new(10.0, 10.0, upper_z),
            settings,
        )
    }

    #[test]
    fn test_equality_constrained_projection() {
        let problem = plane_problem(10.0, SolverSettings::default());
        let report = problem.minimize(Point::new(5.0, 5.0, 5.0)).unwrap();

        let expected = Point::new(0.0, 1.0, 2.0);
        assert!(
            (report.x - expected).norm() < 1e-4,
            "got {:?}",
            report.x.as_slice()
        );
        assert!(report.constraint.abs() <= 1e-6);
        assert!((report.cost - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_active_upper_bound() {
        let problem = plane_problem(1.5, SolverSettings::default());
        let report = problem.minimize(Point::new(0.0, 0.0, 0.0)).unwrap();

        let expected = Point::new(0.25, 1.25, 1.5);
        assert!(
            (report.x - expected).norm() < 1e-4,
            "got {:?}",
            report.x.as_slice()
        );
        assert!(report.x[2] <= 1.5);
    }

    #[test]
    fn test_start_outside_box_is_clipped() {
        let problem = plane_problem(1.5, SolverSettings::default());
        let report = problem.minimize(Point::new(50.0, -50.0, 50.0)).unwrap();
        assert!(report.x.iter().all(|v| v.abs() <= 10.0));
        assert!(report.constraint.abs() <= 1e-6);
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let settings = SolverSettings {
            max_iterations: 1,
            ..SolverSettings::default()
        };
        let problem = plane_problem(10.0, settings);
        let err = problem.minimize(Point::new(5.0, 5.0, 5.0)).unwrap_err();
        assert!(matches!(err, NucradError::FitDidNotConverge { .. }));
    }

    #[test]
    fn test_infeasible_constraint_reports_failure() {
        let settings = SolverSettings {
            max_outer_iterations: 5,
            ..SolverSettings::default()
        };
        // 盒约束内 x₀ + x₁ + x₂ ≤ 3，无法等于 100
        let problem = ConstrainedLeastSquares::new(
            |x: &Point| -> Result<Vec<f64>> { Ok(vec![x[0], x[1], x[2]]) },
            |x: &Point| -> Result<f64> { Ok(100.0 - x.sum()) },
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
            settings,
        );
        let err = problem.minimize(Point::new(0.5, 0.5, 0.5)).unwrap_err();
        assert!(matches!(err, NucradError::FitDidNotConverge { .. }));
    }

    #[test]
    fn test_settings_validation() {
        assert!(SolverSettings::default().validate().is_ok());
        let bad = SolverSettings {
            penalty_growth: 1.0,
            ..SolverSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
