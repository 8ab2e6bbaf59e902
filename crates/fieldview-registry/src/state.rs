//! 附着状态机定义
//!
//! 定义注册表与遥测 sink 的绑定状态，`Unattached → Attached` 单向迁移。

use std::sync::atomic::{AtomicU8, Ordering};

/// 注册表的 sink 绑定状态
///
/// # 状态说明
///
/// - **Unattached**: 初始状态，sink 尚未出现，发布被推迟
/// - **Attached**: 终态，sink 已记录，所有对象持有发布句柄
///
/// # 设计目的
///
/// 迁移在注册表生命周期内只发生一次。真正的原子性由注册表的
/// 成员锁保证（记录 sink + 遍历附着在同一临界区内完成）；
/// 本类型只是迁移结果的无锁镜像，供诊断路径在不触碰成员锁的
/// 情况下查询。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SinkState {
    /// 未附着（初始状态）
    #[default]
    Unattached = 0,

    /// 已附着（终态）
    Attached = 1,
}

impl SinkState {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Unattached。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unattached,
            1 => Self::Attached,
            _ => Self::Unattached, // 无效值默认为 Unattached
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否已附着
    pub fn is_attached(self) -> bool {
        self == Self::Attached
    }
}

/// sink 绑定状态（原子版本，用于线程间共享）
///
/// # 使用场景
///
/// - 控制循环线程通过 `get()` 判断发布是否已经生效
/// - 注册表在附着临界区内通过 `set()` 迁移状态
#[derive(Debug)]
pub struct AtomicSinkState {
    inner: AtomicU8,
}

impl AtomicSinkState {
    /// 创建新的原子状态
    pub fn new(state: SinkState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    ///
    /// # 参数
    ///
    /// - `ordering`: 内存序（通常使用 Relaxed 即可）
    pub fn get(&self, ordering: Ordering) -> SinkState {
        SinkState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    ///
    /// # 参数
    ///
    /// - `state`: 新状态
    /// - `ordering`: 内存序
    pub fn set(&self, state: SinkState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }
}

impl Default for AtomicSinkState {
    fn default() -> Self {
        Self::new(SinkState::Unattached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_state_conversions() {
        assert_eq!(SinkState::Unattached.as_u8(), 0);
        assert_eq!(SinkState::Attached.as_u8(), 1);

        assert!(!SinkState::Unattached.is_attached());
        assert!(SinkState::Attached.is_attached());
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(SinkState::from_u8(0), SinkState::Unattached);
        assert_eq!(SinkState::from_u8(1), SinkState::Attached);
        assert_eq!(SinkState::from_u8(255), SinkState::Unattached); // 无效值
    }

    #[test]
    fn test_atomic_sink_state() {
        let state = AtomicSinkState::default();
        assert_eq!(state.get(Ordering::Relaxed), SinkState::Unattached);

        state.set(SinkState::Attached, Ordering::Relaxed);
        assert_eq!(state.get(Ordering::Relaxed), SinkState::Attached);
    }
}
