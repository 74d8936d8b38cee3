//! # 解析器模块
//!
//! 读取弹性散射测量数据。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/measurement.rs` 数据模型
//! - 子模块: scattering_csv

pub mod scattering_csv;

pub use scattering_csv::load_scattering_csv;
