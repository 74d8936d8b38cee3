//! # 拟合配置
//!
//! 显式的拟合配置对象，由 CLI 构建后传入 `ParameterFitter`。
//!
//! ## 依赖关系
//! - 被 `fit/fitter.rs`、`commands/fit.rs` 使用
//! - 使用 `fit/solver.rs` 的 SolverSettings

use crate::error::{NucradError, Result};
use crate::fit::solver::SolverSettings;
use crate::models::{NuclearParams, ParameterBounds};

/// 默认初值 [ρ₀, a, b]（核单位）
pub const DEFAULT_INITIAL_GUESS: [f64; 3] = [0.07, 4.0, 5.0];

/// 拟合配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// 参数盒约束（核单位）
    pub bounds: ParameterBounds,
    /// 初值（核单位），拟合开始前裁剪进边界
    pub initial_guess: [f64; 3],
    /// 求解器设置
    pub solver: SolverSettings,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            bounds: ParameterBounds::default(),
            initial_guess: DEFAULT_INITIAL_GUESS,
            solver: SolverSettings::default(),
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        NuclearParams::from_array(self.initial_guess)?;
        self.solver.validate()
    }

    /// 裁剪后的起点
    pub fn start(&self) -> [f64; 3] {
        self.bounds.clamp(self.initial_guess)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.solver.max_iterations = max_iterations;
        self
    }
}

/// 解析 "rho0,a,b" 形式的参数三元组
pub fn parse_parameters(input: &str) -> Result<[f64; 3]> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| {
            NucradError::InvalidArgument(format!(
                "Invalid parameters '{}'. Expected 'rho0,a,b', e.g. 0.07,4,5",
                input
            ))
        })?;

    match values.as_slice() {
        [rho0, a, b] => Ok([*rho0, *a, *b]),
        _ => Err(NucradError::InvalidArgument(format!(
            "Parameters need exactly three values (rho0,a,b), got {}",
            values.len()
        ))),
    }
}

/// 解析 "min-max" 形式的区间，两端可用科学计数法（如 6e-2-8e-2）
pub fn parse_bounds(range: &str) -> Result<(f64, f64)> {
    let (lo, hi) =
        split_range(range).ok_or_else(|| NucradError::InvalidRange(range.to_string()))?;

    let min: f64 = lo
        .trim()
        .parse()
        .map_err(|_| NucradError::InvalidRange(range.to_string()))?;
    let max: f64 = hi
        .trim()
        .parse()
        .map_err(|_| NucradError::InvalidRange(range.to_string()))?;

    if max <= min {
        return Err(NucradError::InvalidRange(format!(
            "{} (must be min < max)",
            range
        )));
    }

    Ok((min, max))
}

/// 在第一个分隔用的 '-' 处切分：前导负号和指数符号后的 '-' 不算
fn split_range(range: &str) -> Option<(&str, &str)> {
    range
        .char_indices()
        .find(|&(i, c)| {
            c == '-'
                && !matches!(
                    range[..i].trim_end().chars().last(),
                    None | Some('e') | Some('E')
                )
        })
        .map(|(i, _)| (&range[..i], &range[i + 1..]))
}
