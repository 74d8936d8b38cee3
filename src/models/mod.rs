//! # 数据模型模块
//!
//! 定义电荷密度参数、散射测量数据和拟合结果的值对象。
//!
//! ## 依赖关系
//! - 被 `physics/`、`fit/`、`parsers/` 和 `commands/` 使用
//! - 子模块: params, measurement, fit_result

pub mod fit_result;
pub mod measurement;
pub mod params;

pub use fit_result::FitResult;
pub use measurement::{Measurement, NuclearTarget, ScatteringData};
pub use params::{NuclearParams, ParameterBounds, SiParams};
