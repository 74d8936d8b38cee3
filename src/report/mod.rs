//! # 报告模块
//!
//! 拟合结果和预测曲线的导出与绘图。
//!
//! ## 子模块
//! - `curves`: 导出和绘图共用的数据序列
//! - `export`: CSV 导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/fit.rs`、`commands/predict.rs` 使用
//! - 使用 `physics/` 和 `models/`

pub mod curves;
pub mod export;
pub mod plot;

pub use plot::PlotOptions;
