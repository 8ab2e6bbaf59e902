//! 航向角类型定义
//!
//! 内部以度数存储：遥测线格式以度表示，度数存储保证
//! `from_degrees(d).degrees() == d` 精确往返，不让度/弧度换算的
//! 舍入噪声进入发布值。弧度仅在构造和读取时换算。

/// 2D 航向角
///
/// # 设计目的
///
/// - **单一存储单位**：内部只存度数（遥测线格式的单位），避免
///   换算噪声进入发布路径
/// - **Copy trait**：零成本复制，适合高频位姿更新场景
/// - **无归一化**：不主动折叠到 `(-180, 180]`，保留调用者给定的
///   角度值，保证精确往返
///
/// # 示例
///
/// ```rust
/// use fieldview_pose::Rotation2d;
///
/// let rot = Rotation2d::from_degrees(90.0);
/// assert_eq!(rot.degrees(), 90.0);
/// assert!((rot.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation2d {
    /// 航向角（度）
    degrees: f64,
}

impl Rotation2d {
    /// 从弧度创建
    pub fn new(radians: f64) -> Self {
        Self {
            degrees: radians.to_degrees(),
        }
    }

    /// 从度数创建
    pub const fn from_degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    /// 获取弧度值
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// 获取度数值
    pub const fn degrees(&self) -> f64 {
        self.degrees
    }

    /// 角度分量是否为有限值（非 NaN / 非无穷）
    pub fn is_finite(&self) -> bool {
        self.degrees.is_finite()
    }
}
