//! 场地位姿对象
//!
//! [`FieldObject`] 持有一个命名位姿，并在持有发布句柄时把每次
//! 位姿变更推送到遥测 sink。句柄在附着前不存在，发布被推迟。
//!
//! # 锁域
//!
//! 每个对象一把锁，保护"位姿 + 句柄"对：
//! - 对象间的位姿更新互不阻塞
//! - 附着时"打开句柄 + 发布当前位姿"在同一临界区内完成，
//!   保证 sink 在附着瞬间反映最后已知状态
//!
//! 另有一份 `ArcSwap` 位姿快照供读路径使用，`pose()` 永不被
//! 并发发布阻塞。

use crate::metrics::FieldMetrics;
use arc_swap::ArcSwap;
use fieldview_pose::Pose2d;
use fieldview_sink::{PoseEntry, SinkError, TelemetrySink};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// 位姿 + 句柄（细粒度锁域的被保护内容）
struct ObjectInner {
    /// 当前位姿
    pose: Pose2d,
    /// 发布句柄（附着后存在，恰好一个）
    entry: Option<Arc<dyn PoseEntry>>,
}

/// 命名位姿对象
///
/// 由注册表独占拥有并创建；外部通过 `Arc` 共享引用更新位姿。
/// 同名的 `get-or-create` 查找返回同一实例（引用相等）。
pub struct FieldObject {
    /// 对象名（不可变，注册表内唯一键）
    name: String,
    /// 位姿 + 句柄（单锁保护）
    inner: Mutex<ObjectInner>,
    /// 位姿读快照（无锁读取，写路径在锁内同步刷新）
    snapshot: ArcSwap<Pose2d>,
    /// 注册表共享指标
    metrics: Arc<FieldMetrics>,
}

impl FieldObject {
    /// 创建对象（仅注册表调用）
    pub(crate) fn new(name: impl Into<String>, pose: Pose2d, metrics: Arc<FieldMetrics>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(ObjectInner { pose, entry: None }),
            snapshot: ArcSwap::from_pointee(pose),
            metrics,
        }
    }

    /// 对象名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取当前位姿（无锁，纳秒级返回）
    ///
    /// # 性能
    ///
    /// - 无锁读取（ArcSwap::load）
    /// - 返回快照副本（Copy）
    /// - 永不被并发发布阻塞
    pub fn pose(&self) -> Pose2d {
        **self.snapshot.load()
    }

    /// 是否已持有发布句柄
    pub fn is_attached(&self) -> bool {
        self.lock_inner().entry.is_some()
    }

    /// 替换位姿并发布
    ///
    /// 句柄存在时立即发布 `[x, y, heading_degrees]`；否则仅存储，
    /// 发布推迟到附着时刻。发布失败只记日志和指标，不向调用者
    /// 传播（本层没有异步错误通道）。
    pub fn set_pose(&self, pose: Pose2d) {
        let publish_result = {
            let mut inner = self.lock_inner();
            inner.pose = pose;
            self.snapshot.store(Arc::new(pose));
            inner
                .entry
                .as_ref()
                .map(|entry| entry.publish(&pose.to_sink_values()))
        };

        // 指标在锁外更新，减少锁持有时间
        match publish_result {
            Some(Ok(())) => {
                self.metrics.publishes_total.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            },
            Some(Err(e)) => {
                warn!(name = %self.name, error = %e, "pose publish failed");
                self.metrics.publish_errors.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            },
            None => {
                // 未附着：推迟发布
            },
        }
    }

    /// 附着到 sink：打开句柄并立即发布当前位姿
    ///
    /// 幂等：已持有句柄时是空操作，绝不重复打开。
    /// 打开与首次发布在对象锁内完成，与并发的 `set_pose` 串行化。
    pub(crate) fn attach(&self, sink: &dyn TelemetrySink) -> Result<(), SinkError> {
        let publish_result = {
            let mut inner = self.lock_inner();
            if inner.entry.is_some() {
                return Ok(());
            }
            let entry = sink.open(&self.name)?;
            let result = entry.publish(&inner.pose.to_sink_values());
            inner.entry = Some(entry);
            result
        };

        match publish_result {
            Ok(()) => {
                self.metrics.publishes_total.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            },
            Err(e) => {
                warn!(name = %self.name, error = %e, "initial publish on attach failed");
                self.metrics.publish_errors.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            },
        }
        Ok(())
    }

    /// 释放发布句柄
    ///
    /// 幂等：句柄不存在时是空操作。关闭在锁外执行，已取出的
    /// 句柄不再被任何发布路径引用。
    pub(crate) fn detach(&self) -> Result<(), SinkError> {
        let entry = self.lock_inner().entry.take();
        match entry {
            Some(entry) => entry.close(),
            None => Ok(()),
        }
    }

    /// 获取内部锁，毒化时恢复内部值
    ///
    /// 每次变更都在单个临界区内保持结构完整，毒化只意味着某个
    /// 写者线程 panic，内部值仍然有效。
    fn lock_inner(&self) -> MutexGuard<'_, ObjectInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FieldObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldObject")
            .field("name", &self.name)
            .field("pose", &self.pose())
            .field("attached", &self.is_attached())
            .finish()
    }
}
