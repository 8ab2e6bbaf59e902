//! 注册表性能指标
//!
//! 原子计数器集合，用于监控发布链路健康状态。
//! 所有计数使用 `Relaxed` 序：指标只求最终一致，不参与同步。

use std::sync::atomic::{AtomicU64, Ordering};

/// 注册表指标（原子计数器）
#[derive(Debug, Default)]
pub struct FieldMetrics {
    /// 累计成功发布次数
    pub publishes_total: AtomicU64,

    /// 累计发布失败次数（失败只记日志和计数，不向调用者传播）
    pub publish_errors: AtomicU64,

    /// 累计创建的对象数（机器人条目计入）
    pub objects_created: AtomicU64,

    /// 累计移除的对象数
    pub objects_removed: AtomicU64,

    /// 附着遍历执行次数（首次附着 + 保守重试）
    pub attach_passes: AtomicU64,
}

impl FieldMetrics {
    /// 创建新的指标集合（全部清零）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前所有计数器的快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            publishes_total: self.publishes_total.load(Ordering::Relaxed),
            publish_errors: self.publish_errors.load(Ordering::Relaxed),
            objects_created: self.objects_created.load(Ordering::Relaxed),
            objects_removed: self.objects_removed.load(Ordering::Relaxed),
            attach_passes: self.attach_passes.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（普通值，便于日志输出和断言）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// 累计成功发布次数
    pub publishes_total: u64,
    /// 累计发布失败次数
    pub publish_errors: u64,
    /// 累计创建的对象数
    pub objects_created: u64,
    /// 累计移除的对象数
    pub objects_removed: u64,
    /// 附着遍历执行次数
    pub attach_passes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = FieldMetrics::new();
        metrics.publishes_total.fetch_add(3, Ordering::Relaxed);
        metrics.objects_created.fetch_add(1, Ordering::Relaxed);

        let snap = metrics.snapshot();
        assert_eq!(snap.publishes_total, 3);
        assert_eq!(snap.objects_created, 1);
        assert_eq!(snap.publish_errors, 0);
    }
}
