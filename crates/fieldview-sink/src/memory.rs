//! 进程内遥测后端
//!
//! `MemorySink` 把发布值保存在共享的主题表中，并维护每个主题的
//! 打开/关闭句柄计数。注册表的"恰好一个句柄"不变量直接用这些
//! 计数验证，因此它既是参考后端也是测试替身。
//!
//! # 事件流
//!
//! [`MemorySink::with_events`] 返回 `(sink, rx)` 对，所有打开、发布、
//! 关闭动作通过无界 channel 异步送出，供监控或测试消费。
//! 发送端使用 `try_send` 语义（`Sender::send` 对无界队列不阻塞），
//! 接收端掉线时事件被静默丢弃。

use crate::{PoseEntry, SinkError, TelemetrySink};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// 遥测事件（事件流模式下送出）
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// 条目被打开
    Opened {
        /// 主题名
        name: String,
    },
    /// 条目发布了一组值
    Published {
        /// 主题名
        name: String,
        /// 发布的值
        values: Vec<f64>,
    },
    /// 条目被关闭
    Closed {
        /// 主题名
        name: String,
    },
}

/// 单个主题的状态
#[derive(Debug, Default)]
struct TopicState {
    /// 最近一次发布的值（空数组 = 尚无位姿）
    value: Vec<f64>,
    /// 当前打开的句柄数
    open_handles: usize,
    /// 累计关闭次数
    closed_count: usize,
}

/// 共享主题表
type TopicTable = Arc<RwLock<HashMap<String, TopicState>>>;

/// 进程内遥测后端
///
/// `Clone` 共享同一张主题表：测试侧保留一个克隆即可在附着后
/// 检查注册表写入的值和句柄计数。
///
/// # 示例
///
/// ```rust
/// use fieldview_sink::{MemorySink, TelemetrySink};
///
/// let sink = MemorySink::new();
/// let entry = sink.open("Robot").unwrap();
/// entry.publish(&[1.0, 2.0, 0.0]).unwrap();
/// assert_eq!(sink.value("Robot"), Some(vec![1.0, 2.0, 0.0]));
/// ```
#[derive(Clone)]
pub struct MemorySink {
    topics: TopicTable,
    events: Option<Sender<SinkEvent>>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    /// 创建后端（无事件流）
    pub fn new() -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            events: None,
        }
    }

    /// 创建后端并附带事件流
    ///
    /// 返回 `(sink, rx)`，所有打开/发布/关闭动作以 [`SinkEvent`]
    /// 形式送入 `rx`。
    pub fn with_events() -> (Self, Receiver<SinkEvent>) {
        let (tx, rx) = unbounded();
        let sink = Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            events: Some(tx),
        };
        (sink, rx)
    }

    /// 读取主题的最近发布值
    ///
    /// 主题不存在返回 `None`；空数组表示条目已打开但尚未发布。
    pub fn value(&self, name: &str) -> Option<Vec<f64>> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics.get(name).map(|t| t.value.clone())
    }

    /// 当前打开的句柄数
    pub fn open_handles(&self, name: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics.get(name).map(|t| t.open_handles).unwrap_or(0)
    }

    /// 累计关闭次数
    pub fn closed_count(&self, name: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics.get(name).map(|t| t.closed_count).unwrap_or(0)
    }

    /// 已知主题名列表（按字典序）
    pub fn topic_names(&self) -> Vec<String> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = topics.keys().cloned().collect();
        names.sort();
        names
    }

    fn emit(&self, event: SinkEvent) {
        if let Some(tx) = &self.events {
            // 接收端掉线时静默丢弃
            let _ = tx.send(event);
        }
    }
}

impl TelemetrySink for MemorySink {
    fn open(&self, name: &str) -> Result<Arc<dyn PoseEntry>, SinkError> {
        {
            let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
            let topic = topics.entry(name.to_string()).or_default();
            topic.open_handles += 1;
        }
        trace!(name, "sink entry opened");
        self.emit(SinkEvent::Opened {
            name: name.to_string(),
        });

        Ok(Arc::new(MemoryEntry {
            name: name.to_string(),
            topics: Arc::clone(&self.topics),
            events: self.events.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// `MemorySink` 的发布句柄
struct MemoryEntry {
    name: String,
    topics: TopicTable,
    events: Option<Sender<SinkEvent>>,
    /// 关闭标志（幂等关闭的判据）
    closed: AtomicBool,
}

impl MemoryEntry {
    fn emit(&self, event: SinkEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

impl PoseEntry for MemoryEntry {
    fn publish(&self, values: &[f64]) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        {
            let mut topics = self.topics.write().map_err(|_| SinkError::PoisonedLock)?;
            let topic = topics.entry(self.name.clone()).or_default();
            topic.value = values.to_vec();
        }

        trace!(name = %self.name, ?values, "sink entry published");
        self.emit(SinkEvent::Published {
            name: self.name.clone(),
            values: values.to_vec(),
        });
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        // swap 保证并发 close 只有一个赢家执行计数更新
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        {
            let mut topics = self.topics.write().map_err(|_| SinkError::PoisonedLock)?;
            if let Some(topic) = topics.get_mut(&self.name) {
                topic.open_handles = topic.open_handles.saturating_sub(1);
                topic.closed_count += 1;
            }
        }

        trace!(name = %self.name, "sink entry closed");
        self.emit(SinkEvent::Closed {
            name: self.name.clone(),
        });
        Ok(())
    }
}
