//! # Fieldview Sink Layer
//!
//! 遥测发布抽象层，提供统一的键值发布接口。
//!
//! 注册表层不关心遥测数据最终去往何处（网络表、仪表盘、录制文件），
//! 只通过 [`TelemetrySink`] 打开命名条目、通过 [`PoseEntry`] 发布位姿数组。
//!
//! ## 线格式
//!
//! 每个条目发布 `[x, y, heading_degrees]` 三元素数组；
//! 空数组是"尚无位姿"的初始占位值（条目打开后、首次发布前）。
//!
//! ## 后端
//!
//! - [`MemorySink`]: 进程内参考后端，带打开/关闭计数和可选事件流，
//!   同时用作测试替身。真实网络传输在本 workspace 范围之外。

use std::sync::Arc;
use thiserror::Error;

pub mod memory;

// 重新导出常用类型
pub use memory::{MemorySink, SinkEvent};

/// 遥测层统一错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 条目已关闭，拒绝后续发布
    #[error("Entry already closed")]
    Closed,

    /// 锁被毒化（持锁线程 panic）
    #[error("Poisoned sink lock (thread panic)")]
    PoisonedLock,

    /// 后端自定义错误
    #[error("Sink backend error: {0}")]
    Backend(String),
}

/// 按名字打开的发布句柄
///
/// 每个注册表对象在附着后恰好持有一个条目。
///
/// # 线程安全
///
/// 实现必须是 `Send + Sync`：同一条目可能被控制循环线程和
/// 注册表的附着流程并发使用。
pub trait PoseEntry: Send + Sync {
    /// 发布一组值（覆盖旧值）
    ///
    /// # 错误
    ///
    /// - [`SinkError::Closed`]: 条目已被关闭
    fn publish(&self, values: &[f64]) -> Result<(), SinkError>;

    /// 关闭条目，释放遥测侧资源
    ///
    /// 幂等：第二次及之后的调用是空操作并返回 `Ok`。
    fn close(&self) -> Result<(), SinkError>;
}

/// 遥测发布目的地
///
/// 注册表通过此 trait 与具体后端解耦。
pub trait TelemetrySink: Send + Sync {
    /// 按名字打开一个发布条目
    ///
    /// 新条目持有空数组占位值，直到第一次 `publish`。
    /// 对同一名字重复打开会得到指向同一主题的新句柄；
    /// 注册表侧保证每个对象只打开一次。
    fn open(&self, name: &str) -> Result<Arc<dyn PoseEntry>, SinkError>;
}
