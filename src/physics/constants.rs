//! # 物理常数表
//!
//! 基本物理常数与单位换算因子（SI 单位）。
//!
//! ## 依赖关系
//! - 被 `physics/`、`models/params.rs`、`fit/` 使用
//! - 纯静态数据，无外部依赖

/// 元电荷 (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_63e-19;

/// 真空光速 (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// 约化普朗克常数 (J·s)
pub const HBAR: f64 = 1.054_571_82e-34;

/// 精细结构常数
pub const FINE_STRUCTURE: f64 = 1.0 / 137.036;

/// 电子静止质量 (kg)
pub const ELECTRON_MASS: f64 = 9.109_383_7e-31;

/// 1 eV 对应的焦耳数
pub const EV_TO_JOULE: f64 = 1.602_177e-19;

/// 1 MeV 对应的焦耳数
pub const MEV_TO_JOULE: f64 = EV_TO_JOULE * 1e6;

/// 1 fm 对应的米数
pub const FEMTOMETRE: f64 = 1e-15;

/// m² → barn
pub const SQUARE_METRE_TO_BARN: f64 = 1e28;

/// barn → mb
pub const BARN_TO_MILLIBARN: f64 = 1e3;

/// 截面换算：m²/sr → mb/sr（数据文件约定）
pub const SQUARE_METRE_TO_MILLIBARN: f64 = SQUARE_METRE_TO_BARN * BARN_TO_MILLIBARN;

/// 电子静止能量 (J)
pub fn electron_rest_energy() -> f64 {
    ELECTRON_MASS * SPEED_OF_LIGHT * SPEED_OF_LIGHT
}
