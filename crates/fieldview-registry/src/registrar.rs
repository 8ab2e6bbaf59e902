//! 诊断注册服务
//!
//! 注册表在构造时向外部注册服务登记一次，仅用于外部内省/调试，
//! 对注册表语义没有任何影响。以注入的 trait object 形式存在，
//! 核心逻辑不依赖它的正确性。

/// 诊断注册服务接口
///
/// # 设计原则
///
/// - **无语义影响**: 实现可以是完全的空操作
/// - **非阻塞**: 在注册表构造/析构路径上调用，实现不应执行耗时操作
///
/// # 示例
///
/// ```rust
/// use fieldview_registry::{Registrar, NoopRegistrar};
/// use std::sync::Arc;
///
/// let registrar: Arc<dyn Registrar> = Arc::new(NoopRegistrar);
/// registrar.register("Field", "Field2d");
/// registrar.unregister("Field");
/// ```
pub trait Registrar: Send + Sync {
    /// 登记一个实例
    ///
    /// # 参数
    ///
    /// - `label`: 实例标签（注册表的展示名）
    /// - `kind`: 实例类型标识
    fn register(&self, label: &str, kind: &str);

    /// 注销一个实例
    fn unregister(&self, label: &str);
}

/// 空操作注册服务（默认实现）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistrar;

impl Registrar for NoopRegistrar {
    fn register(&self, _label: &str, _kind: &str) {}

    fn unregister(&self, _label: &str) {}
}

/// 基于 tracing 的注册服务
///
/// 把登记/注销动作输出为结构化日志，供开发期排查实例生命周期。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRegistrar;

impl Registrar for TracingRegistrar {
    fn register(&self, label: &str, kind: &str) {
        tracing::info!(label, kind, "registered instance");
    }

    fn unregister(&self, label: &str) {
        tracing::info!(label, "unregistered instance");
    }
}
