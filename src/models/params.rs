//! # 电荷密度参数
//!
//! Fermi 型电荷密度的三个参数 (ρ₀, a, b) 在两套单位制下的表示：
//! - `NuclearParams`: 核单位 (e/fm³, fm, fm)，供优化器使用
//! - `SiParams`: SI 单位 (C/m³, m, m)，供物理积分使用
//!
//! 两者是不同的类型，单位换算只能通过 `From` 转换完成。
//!
//! ## 依赖关系
//! - 被 `physics/density.rs`、`fit/` 使用
//! - 使用 `physics/constants.rs` 的换算因子

use crate::error::{NucradError, Result};
use crate::physics::constants::{ELEMENTARY_CHARGE, FEMTOMETRE};

/// 核单位下的电荷密度参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NuclearParams {
    /// 中心电荷密度 (e/fm³)
    rho0: f64,
    /// 半密度半径 (fm)
    a: f64,
    /// 表面弥散长度 (fm)
    b: f64,
}

impl NuclearParams {
    /// 创建并校验参数
    pub fn new(rho0: f64, a: f64, b: f64) -> Result<Self> {
        validate(rho0, a, b)?;
        Ok(Self { rho0, a, b })
    }

    /// 从 `[rho0, a, b]` 创建
    pub fn from_array(x: [f64; 3]) -> Result<Self> {
        Self::new(x[0], x[1], x[2])
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.rho0, self.a, self.b]
    }

    pub fn rho0(&self) -> f64 {
        self.rho0
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// 换算为 SI 单位
    pub fn to_si(&self) -> SiParams {
        SiParams::from(*self)
    }
}

/// SI 单位下的电荷密度参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiParams {
    /// 中心电荷密度 (C/m³)
    rho0: f64,
    /// 半密度半径 (m)
    a: f64,
    /// 表面弥散长度 (m)
    b: f64,
}

impl SiParams {
    pub fn rho0(&self) -> f64 {
        self.rho0
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }
}

impl From<NuclearParams> for SiParams {
    fn from(x: NuclearParams) -> Self {
        let fm3 = FEMTOMETRE * FEMTOMETRE * FEMTOMETRE;
        SiParams {
            rho0: x.rho0 * ELEMENTARY_CHARGE / fm3,
            a: x.a * FEMTOMETRE,
            b: x.b * FEMTOMETRE,
        }
    }
}

impl From<SiParams> for NuclearParams {
    fn from(x: SiParams) -> Self {
        let fm3 = FEMTOMETRE * FEMTOMETRE * FEMTOMETRE;
        NuclearParams {
            rho0: x.rho0 * fm3 / ELEMENTARY_CHARGE,
            a: x.a / FEMTOMETRE,
            b: x.b / FEMTOMETRE,
        }
    }
}

impl std::fmt::Display for NuclearParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rho0 = {:.5} e/fm^3, a = {:.4} fm, b = {:.4} fm",
            self.rho0, self.a, self.b
        )
    }
}

/// 参数校验：三个参数都必须有限且为正
fn validate(rho0: f64, a: f64, b: f64) -> Result<()> {
    for (name, value) in [("rho0", rho0), ("a", a), ("b", b)] {
        if !value.is_finite() {
            return Err(NucradError::invalid_params(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if value <= 0.0 {
            return Err(NucradError::invalid_params(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

/// 核单位参数的盒约束
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    /// ρ₀ 范围 (e/fm³)
    pub rho0: (f64, f64),
    /// a 范围 (fm)
    pub a: (f64, f64),
    /// b 范围 (fm)
    pub b: (f64, f64),
}

impl Default for ParameterBounds {
    fn default() -> Self {
        ParameterBounds {
            rho0: (0.06, 0.08),
            a: (3.0, 5.0),
            b: (0.3, 0.7),
        }
    }
}

impl ParameterBounds {
    pub fn lower(&self) -> [f64; 3] {
        [self.rho0.0, self.a.0, self.b.0]
    }

    pub fn upper(&self) -> [f64; 3] {
        [self.rho0.1, self.a.1, self.b.1]
    }

    /// 检查区间本身是否合法（下界为正且小于上界）
    pub fn validate(&self) -> Result<()> {
        for (name, (lo, hi)) in [("rho0", self.rho0), ("a", self.a), ("b", self.b)] {
            if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo >= hi {
                return Err(NucradError::InvalidRange(format!(
                    "{} bounds must satisfy 0 < min < max, got {}-{}",
                    name, lo, hi
                )));
            }
        }
        Ok(())
    }

    /// 把向量裁剪进盒约束
    pub fn clamp(&self, x: [f64; 3]) -> [f64; 3] {
        let lo = self.lower();
        let hi = self.upper();
        [
            x[0].clamp(lo[0], hi[0]),
            x[1].clamp(lo[1], hi[1]),
            x[2].clamp(lo[2], hi[2]),
        ]
    }

    pub fn contains(&self, x: &NuclearParams) -> bool {
        let v = x.to_array();
        let lo = self.lower();
        let hi = self.upper();
        (0..3).all(|i| v[i] >= lo[i] && v[i] <= hi[i])
    }
}
