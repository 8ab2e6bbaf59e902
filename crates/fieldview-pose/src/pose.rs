//! 2D 位姿类型定义
//!
//! 位姿 = 平面位置（米） + 航向角，是注册表中每个对象唯一持有的几何状态。

use crate::rotation::Rotation2d;

/// 遥测数组的元素个数：`[x, y, heading_degrees]`
pub const POSE_VALUE_LEN: usize = 3;

/// 2D 位姿（x, y, 航向）
///
/// # 设计目的
///
/// `Pose2d` 是注册表层和遥测层之间的中间抽象，提供：
/// - **层次解耦**：注册表不依赖遥测后端的线格式细节
/// - **统一编码**：上层通过 [`Pose2d::to_sink_values`] 得到统一的发布格式
/// - **Copy trait**：零成本复制，适合高频更新场景（控制循环每周期刷新）
///
/// # 有效性
///
/// 本类型不在构造时校验分量有限性（与帧类型一样保持 POD 语义），
/// 校验责任在注册表的写入边界，见 [`Pose2d::is_finite`]。
///
/// # 转换示例
///
/// ```rust
/// use fieldview_pose::{Pose2d, Rotation2d};
///
/// let pose = Pose2d::new(1.5, 2.0, Rotation2d::from_degrees(90.0));
/// assert_eq!(pose.to_sink_values(), [1.5, 2.0, 90.0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose2d {
    /// X 位置（米）
    x: f64,

    /// Y 位置（米）
    y: f64,

    /// 航向角
    rotation: Rotation2d,
}

impl Pose2d {
    /// 创建位姿
    pub const fn new(x: f64, y: f64, rotation: Rotation2d) -> Self {
        Self { x, y, rotation }
    }

    /// 从 x, y 和度数创建位姿（便捷构造器）
    pub fn from_xy_degrees(x: f64, y: f64, heading_degrees: f64) -> Self {
        Self::new(x, y, Rotation2d::from_degrees(heading_degrees))
    }

    /// X 位置（米）
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Y 位置（米）
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// 航向角
    pub const fn rotation(&self) -> Rotation2d {
        self.rotation
    }

    /// 三个分量是否均为有限值（非 NaN / 非无穷）
    ///
    /// 注册表在写入边界用此检查拒绝无效位姿。
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.rotation.is_finite()
    }

    /// 编码为遥测数组 `[x, y, heading_degrees]`
    ///
    /// 航向在线格式中以度数表示（遥测侧约定）。
    pub fn to_sink_values(&self) -> [f64; POSE_VALUE_LEN] {
        [self.x, self.y, self.rotation.degrees()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_origin() {
        let pose = Pose2d::default();
        assert_eq!(pose.x(), 0.0);
        assert_eq!(pose.y(), 0.0);
        assert_eq!(pose.rotation().degrees(), 0.0);
    }

    #[test]
    fn test_sink_values_heading_in_degrees() {
        let pose = Pose2d::new(3.0, 4.0, Rotation2d::from_degrees(90.0));
        assert_eq!(pose.to_sink_values(), [3.0, 4.0, 90.0]);
    }

    #[test]
    fn test_round_trip_exact() {
        // 构造 → 读取必须无损（注册表层的往返精确性依赖此保证）
        let pose = Pose2d::from_xy_degrees(1.0, 2.0, 0.0);
        assert_eq!(pose.x(), 1.0);
        assert_eq!(pose.y(), 2.0);
        assert_eq!(pose.rotation().degrees(), 0.0);
    }

    #[test]
    fn test_is_finite_rejects_nan_and_infinity() {
        assert!(Pose2d::from_xy_degrees(1.0, 2.0, 3.0).is_finite());
        assert!(!Pose2d::from_xy_degrees(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Pose2d::from_xy_degrees(1.0, f64::INFINITY, 3.0).is_finite());
        assert!(!Pose2d::from_xy_degrees(1.0, 2.0, f64::NEG_INFINITY).is_finite());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let pose = Pose2d::from_xy_degrees(1.25, -2.5, 45.0);
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose2d = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }
}
