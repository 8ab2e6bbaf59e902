//! # Fieldview SDK
//!
//! 场地位姿注册表的统一入口，重新导出各层模块：
//!
//! - [`pose`]: 2D 位姿类型（[`Pose2d`] / [`Rotation2d`]）
//! - [`sink`]: 遥测发布抽象（[`TelemetrySink`] / [`MemorySink`]）
//! - [`registry`]: 并发注册表核心（[`Field`] / [`FieldObject`]）
//!
//! # 快速开始
//!
//! ```rust
//! use fieldview_sdk::{Field, MemorySink, Pose2d};
//! use std::sync::Arc;
//!
//! let field = Field::new();
//! field.set_robot_pose(Pose2d::from_xy_degrees(1.0, 2.0, 0.0)).unwrap();
//!
//! // sink 出现时补齐所有已注册对象的句柄
//! let sink = MemorySink::new();
//! field.attach_sink(Arc::new(sink.clone()));
//! assert_eq!(sink.value("Robot"), Some(vec![1.0, 2.0, 0.0]));
//! ```

/// 2D 位姿类型层
pub use fieldview_pose as pose;

/// 遥测发布抽象层
pub use fieldview_sink as sink;

/// 注册表核心层
pub use fieldview_registry as registry;

// 重新导出常用类型
pub use fieldview_pose::{POSE_VALUE_LEN, Pose2d, Rotation2d};
pub use fieldview_registry::{
    Field, FieldBuilder, FieldError, FieldObject, MetricsSnapshot, NoopRegistrar, Registrar,
    SinkState, TracingRegistrar,
};
pub use fieldview_sink::{MemorySink, PoseEntry, SinkError, SinkEvent, TelemetrySink};

/// 初始化日志（tracing + log 桥接）
///
/// - 安装 `LogTracer`，把 `log` 宏产生的记录转进 tracing
/// - 安装 `tracing_subscriber` fmt 层，过滤规则来自 `RUST_LOG`
///
/// 重复调用是安全的：已初始化时静默返回。
pub fn init_logging() {
    // LogTracer 重复安装会报错，忽略即可
    let _ = tracing_log::LogTracer::init();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
