//! 注册表层模块
//!
//! 本模块提供场地位姿注册表的核心功能，包括：
//! - 命名位姿对象的并发生命周期管理（创建 / 查找 / 移除 / 清空）
//! - 延迟附着协议（sink 可用前注册的对象在附着时补齐句柄）
//! - 双锁域并发模型（注册表成员域 + 每对象位姿域）
//! - 诊断注册服务注入（仅用于外部内省，不影响语义）
//!
//! # 使用场景
//!
//! 机器人控制循环持续更新自身位姿，其他线程动态添加/清除标记点，
//! 周边框架在某个时刻把遥测 sink 附着上来——三者可以任意交错。

mod builder;
mod error;
pub mod field;
pub mod metrics;
pub mod object;
pub mod registrar;
pub mod state;

pub use builder::FieldBuilder;
pub use error::FieldError;
pub use field::{Field, POINT_NAME_PREFIX, ROBOT_NAME};
pub use metrics::{FieldMetrics, MetricsSnapshot};
pub use object::FieldObject;
pub use registrar::{NoopRegistrar, Registrar, TracingRegistrar};
pub use state::{AtomicSinkState, SinkState};
