//! Builder 模式实现
//!
//! 提供链式构造 [`Field`] 实例的便捷方式。

use crate::error::FieldError;
use crate::field::Field;
use crate::registrar::{NoopRegistrar, Registrar};
use fieldview_pose::Pose2d;
use std::sync::Arc;

/// Field Builder（链式构造）
///
/// # Example
///
/// ```
/// use fieldview_registry::{FieldBuilder, TracingRegistrar};
/// use fieldview_pose::Pose2d;
/// use std::sync::Arc;
///
/// // 使用默认配置
/// let field = FieldBuilder::new().build().unwrap();
///
/// // 自定义初始位姿和注册服务
/// let field = FieldBuilder::new()
///     .robot_pose(Pose2d::from_xy_degrees(1.0, 2.0, 0.0))
///     .registrar(Arc::new(TracingRegistrar))
///     .label("MainField")
///     .build()
///     .unwrap();
/// ```
pub struct FieldBuilder {
    /// 机器人初始位姿（默认原点）
    robot_pose: Option<Pose2d>,
    /// 诊断注册服务（默认空操作）
    registrar: Option<Arc<dyn Registrar>>,
    /// 登记标签（默认 "Field"）
    label: Option<String>,
}

impl FieldBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self {
            robot_pose: None,
            registrar: None,
            label: None,
        }
    }

    /// 设置机器人初始位姿
    pub fn robot_pose(mut self, pose: Pose2d) -> Self {
        self.robot_pose = Some(pose);
        self
    }

    /// 注入诊断注册服务
    pub fn registrar(mut self, registrar: Arc<dyn Registrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// 设置登记标签
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 构建 Field 实例
    ///
    /// # 错误
    ///
    /// - [`FieldError::InvalidPose`]: 初始位姿包含 NaN / 无穷分量
    pub fn build(self) -> Result<Field, FieldError> {
        let robot_pose = self.robot_pose.unwrap_or_default();
        if !robot_pose.is_finite() {
            return Err(FieldError::InvalidPose);
        }

        Ok(Field::with_parts(
            robot_pose,
            self.registrar.unwrap_or_else(|| Arc::new(NoopRegistrar)),
            self.label.unwrap_or_else(|| "Field".to_string()),
        ))
    }
}

impl Default for FieldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
