//! # 统一错误处理模块
//!
//! 定义 nucrad 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 物理模型错误：参数非法、运动学定义域、奇异求值
//! - 拟合错误：优化器未收敛
//! - I/O、解析、绘图错误
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// nucrad 统一错误类型
#[derive(Error, Debug)]
pub enum NucradError {
    // ─────────────────────────────────────────────────────────────
    // 物理模型错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid charge-density parameters: {reason}")]
    InvalidModelParameters { reason: String },

    #[error(
        "Kinematic domain error: energy {energy:e} J is below the rest energy {rest_energy:e} J"
    )]
    KinematicDomainError { energy: f64, rest_energy: f64 },

    #[error("Singular evaluation: {reason}")]
    SingularEvaluation { reason: String },

    // ─────────────────────────────────────────────────────────────
    // 拟合错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Fit did not converge after {iterations} iterations (charge residual {constraint_residual:e} e): {reason}"
    )]
    FitDidNotConverge {
        iterations: usize,
        constraint_residual: f64,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid measurement data: {0}")]
    InvalidData(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl NucradError {
    /// 构造参数非法错误
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        NucradError::InvalidModelParameters {
            reason: reason.into(),
        }
    }

    /// 构造奇异求值错误
    pub fn singular(reason: impl Into<String>) -> Self {
        NucradError::SingularEvaluation {
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, NucradError>;
