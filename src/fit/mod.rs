//! # 参数拟合模块
//!
//! 在总电荷等式约束和盒约束下，用非线性最小二乘拟合电荷密度参数。
//!
//! ## 子模块
//! - `config`: 拟合配置（边界、初值、迭代预算、容差）
//! - `solver`: 增广 Lagrange + 投影 Levenberg–Marquardt 求解器
//! - `fitter`: 目标函数、电荷约束与拟合入口
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs` 调用
//! - 使用 `physics/` 计算模型截面
//! - 使用 `models/` 的参数与测量数据

pub mod config;
pub mod fitter;
pub mod solver;

pub use config::FitConfig;
pub use fitter::ParameterFitter;
