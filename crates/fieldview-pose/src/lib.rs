//! # Fieldview Pose
//!
//! 场地坐标系中的 2D 位姿类型定义（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `rotation`: 航向角类型（度数存储，弧度换算）
//! - `pose`: 2D 位姿类型（x, y, 航向）
//!
//! ## 遥测编码
//!
//! 位姿在遥测侧的线格式为 `[x, y, heading_degrees]` 三元素数组。
//! 空数组表示"尚无位姿"（附着前的初始占位值）。
//! 编码逻辑见 [`Pose2d::to_sink_values`]。

pub mod pose;
pub mod rotation;

// 重新导出常用类型
pub use pose::{POSE_VALUE_LEN, Pose2d};
pub use rotation::Rotation2d;
