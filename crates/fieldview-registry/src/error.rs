//! 注册表层错误类型定义

use thiserror::Error;

/// 注册表层错误类型
#[derive(Error, Debug)]
pub enum FieldError {
    /// 位姿包含非有限分量（NaN 或无穷）
    ///
    /// 在注册表的写入边界（`set_robot_pose` / `add_point`）校验，
    /// 对象自身的 `set_pose` 保持无错误条件的最小接口。
    #[error("Pose contains a non-finite component (NaN or infinity)")]
    InvalidPose,

    /// 名字被机器人条目保留
    ///
    /// 机器人对象固定在序列首位，不允许被移除。
    #[error("Object name '{0}' is reserved for the robot entry")]
    RobotReserved(String),

    /// 析构时部分句柄关闭失败
    ///
    /// 析构从不中途放弃：能关的句柄全部关闭，失败的聚合上报。
    #[error("Teardown completed with {failed} handle close failure(s)")]
    Teardown {
        /// 关闭失败的句柄数
        failed: usize,
    },
}
