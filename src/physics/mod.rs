//! # 物理模型模块
//!
//! Fermi 电荷分布、相对论运动学和弹性散射截面。
//!
//! ## 子模块
//! - `constants`: 物理常数与单位换算
//! - `density`: 电荷密度与径向积分
//! - `kinematics`: 电子速度与动量
//! - `cross_section`: Rutherford / Mott / 形状因子 / 实验截面
//!
//! ## 依赖关系
//! - 被 `fit/`、`report/` 和 `commands/` 使用
//! - 使用 `models/params.rs` 的 SiParams

pub mod constants;
pub mod cross_section;
pub mod density;
pub mod kinematics;

pub use cross_section::ScatteringModel;
pub use density::{ChargeDensity, IntegrationConfig};
