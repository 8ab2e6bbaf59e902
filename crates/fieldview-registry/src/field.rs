//! 场地注册表（对外 API）
//!
//! [`Field`] 管理一组命名位姿对象并维护它们与遥测 sink 的绑定。
//! 首位条目永远是机器人对象；其余是运行期动态增删的标记点。
//!
//! # 锁域
//!
//! 注册表一把锁保护"成员序列 + sink 引用"：附着协议的
//! "读当前成员 → 记录 sink → 逐个附着"必须观察到一致的成员快照，
//! 因此二者在同一互斥域内。每个对象自己的"位姿 + 句柄"由对象锁
//! 保护（见 [`FieldObject`]）。锁序固定为 注册表锁 → 对象锁，
//! 反向获取不存在。
//!
//! # 延迟附着协议
//!
//! sink 出现前注册的对象没有发布句柄，位姿更新只存储不发布。
//! [`Field::attach_sink`] 在单个临界区内记录 sink 并遍历当前成员
//! 逐个附着；并发的 `object()` / `add_point()` 要么在临界区前加入
//! （被遍历附着），要么在临界区后加入（由创建路径自行附着）——
//! 绝不漏附，也绝不重复附着（对象侧附着幂等）。

use crate::builder::FieldBuilder;
use crate::error::FieldError;
use crate::metrics::{FieldMetrics, MetricsSnapshot};
use crate::object::FieldObject;
use crate::registrar::{NoopRegistrar, Registrar};
use crate::state::{AtomicSinkState, SinkState};
use fieldview_pose::{Pose2d, Rotation2d};
use fieldview_sink::TelemetrySink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// 机器人条目的固定名字（构造时确定，永不移除）
pub const ROBOT_NAME: &str = "Robot";

/// 标记点自动命名前缀（`point-<n>`）
pub const POINT_NAME_PREFIX: &str = "point-";

/// 向诊断注册服务登记时使用的类型标识
const REGISTRAR_KIND: &str = "Field2d";

/// 成员序列 + sink 引用（粗粒度锁域的被保护内容）
struct FieldInner {
    /// 按插入序排列的对象，下标 0 恒为机器人
    objects: Vec<Arc<FieldObject>>,
    /// 遥测 sink（附着后存在）
    sink: Option<Arc<dyn TelemetrySink>>,
}

/// 场地位姿注册表
///
/// # 并发模型
///
/// 所有操作可从不相关的线程并发调用（控制循环线程、遥测线程、
/// 显示采样线程），每个操作都在有界短时间内完成：内存变更加一次
/// 非阻塞的 sink 发布。单对象的更新按单调用者顺序生效，跨调用者
/// 交错为 last-write-wins。
///
/// # 示例
///
/// ```rust
/// use fieldview_registry::Field;
/// use fieldview_pose::Pose2d;
/// use fieldview_sink::MemorySink;
/// use std::sync::Arc;
///
/// let field = Field::new();
/// field.set_robot_pose(Pose2d::from_xy_degrees(1.0, 2.0, 0.0)).unwrap();
///
/// let sink = MemorySink::new();
/// field.attach_sink(Arc::new(sink.clone()));
/// assert_eq!(sink.value("Robot"), Some(vec![1.0, 2.0, 0.0]));
/// ```
pub struct Field {
    /// 成员序列 + sink 引用（单锁保护，附着协议的临界区）
    inner: Mutex<FieldInner>,
    /// 附着状态的无锁镜像（诊断查询用）
    state: AtomicSinkState,
    /// 性能指标（原子计数器）
    metrics: Arc<FieldMetrics>,
    /// 诊断注册服务（注入，默认空操作）
    registrar: Arc<dyn Registrar>,
    /// 登记标签
    label: String,
    /// 析构标志（close 幂等判据）
    closed: AtomicBool,
}

impl Field {
    /// 创建注册表（默认配置：原点机器人位姿、空操作注册服务）
    pub fn new() -> Self {
        Self::with_parts(Pose2d::default(), Arc::new(NoopRegistrar), "Field".to_string())
    }

    /// 创建 Builder（链式构造）
    pub fn builder() -> FieldBuilder {
        FieldBuilder::new()
    }

    /// 内部构造器（由 `new` 和 Builder 调用，参数已校验）
    pub(crate) fn with_parts(
        robot_pose: Pose2d,
        registrar: Arc<dyn Registrar>,
        label: String,
    ) -> Self {
        let metrics = Arc::new(FieldMetrics::new());
        let robot = Arc::new(FieldObject::new(ROBOT_NAME, robot_pose, Arc::clone(&metrics)));
        metrics.objects_created.fetch_add(1, Ordering::Relaxed);

        // 仅用于外部内省，对注册表语义无影响
        registrar.register(&label, REGISTRAR_KIND);
        info!(label, "field registry created");

        Self {
            inner: Mutex::new(FieldInner {
                objects: vec![robot],
                sink: None,
            }),
            state: AtomicSinkState::default(),
            metrics,
            registrar,
            label,
            closed: AtomicBool::new(false),
        }
    }

    // ==================== 机器人条目 ====================

    /// 设置机器人位姿
    ///
    /// 机器人条目恒存在，本操作永不因查找失败出错。
    ///
    /// # 错误
    ///
    /// - [`FieldError::InvalidPose`]: 位姿包含 NaN / 无穷分量
    pub fn set_robot_pose(&self, pose: Pose2d) -> Result<(), FieldError> {
        if !pose.is_finite() {
            return Err(FieldError::InvalidPose);
        }
        self.robot_object().set_pose(pose);
        Ok(())
    }

    /// 设置机器人位姿（x, y, 航向便捷重载）
    ///
    /// # 错误
    ///
    /// - [`FieldError::InvalidPose`]: 位姿包含 NaN / 无穷分量
    pub fn set_robot_pose_xy(
        &self,
        x_meters: f64,
        y_meters: f64,
        rotation: Rotation2d,
    ) -> Result<(), FieldError> {
        self.set_robot_pose(Pose2d::new(x_meters, y_meters, rotation))
    }

    /// 获取机器人位姿
    pub fn robot_pose(&self) -> Pose2d {
        self.robot_object().pose()
    }

    /// 获取机器人对象
    pub fn robot_object(&self) -> Arc<FieldObject> {
        // 不变量：成员序列非空且下标 0 是机器人
        Arc::clone(&self.lock_inner().objects[0])
    }

    // ==================== 动态成员 ====================

    /// 按名字获取或创建对象（get-or-create）
    ///
    /// 线性查找（机器人条目包含在内）；命中返回既有对象（引用相等），
    /// 未命中则创建、追加，并且——仅当 sink 已附着时——立即为新对象
    /// 打开句柄。这是唯一需要检查"sink 是否已附着"的变更路径：
    /// 它跨越附着边界，之后该对象的所有发布都依赖这里建立的句柄。
    ///
    /// 同名重复调用是幂等查找，不是错误。
    pub fn object(&self, name: &str) -> Arc<FieldObject> {
        let obj = {
            let mut inner = self.lock_inner();
            if let Some(existing) = inner.objects.iter().find(|o| o.name() == name) {
                return Arc::clone(existing);
            }

            let obj = Arc::new(FieldObject::new(
                name,
                Pose2d::default(),
                Arc::clone(&self.metrics),
            ));
            if let Some(sink) = &inner.sink {
                // 附着后创建的对象在这里补齐句柄；失败走保守路径，
                // 等待下一次附着遍历重试（对象侧附着幂等）
                if let Err(e) = obj.attach(sink.as_ref()) {
                    warn!(name, error = %e, "attach on create failed");
                }
            }
            inner.objects.push(Arc::clone(&obj));
            obj
        };

        self.metrics.objects_created.fetch_add(1, Ordering::Relaxed);
        debug!(name, "field object created");
        obj
    }

    /// 添加自动命名的标记点并设置其位姿
    ///
    /// 名字从当前序列长度派生（`point-<n>`），与既有名字冲突时递增
    /// 直到唯一。sink 未附着时同样成立：位姿先存储，发布推迟到
    /// [`Field::attach_sink`] 执行时（延迟附着语义）。
    ///
    /// # 错误
    ///
    /// - [`FieldError::InvalidPose`]: 位姿包含 NaN / 无穷分量
    pub fn add_point(&self, pose: Pose2d) -> Result<Arc<FieldObject>, FieldError> {
        if !pose.is_finite() {
            return Err(FieldError::InvalidPose);
        }

        let obj = {
            let mut inner = self.lock_inner();

            // 移除操作可能让长度派生名与幸存者撞名，递增避开
            let mut n = inner.objects.len();
            let mut name = format!("{POINT_NAME_PREFIX}{n}");
            while inner.objects.iter().any(|o| o.name() == name) {
                n += 1;
                name = format!("{POINT_NAME_PREFIX}{n}");
            }

            // 位姿在创建时就位，附着时恰好发布一次
            let obj = Arc::new(FieldObject::new(name, pose, Arc::clone(&self.metrics)));
            if let Some(sink) = &inner.sink {
                if let Err(e) = obj.attach(sink.as_ref()) {
                    warn!(name = obj.name(), error = %e, "attach on add_point failed");
                }
            }
            inner.objects.push(Arc::clone(&obj));
            obj
        };

        self.metrics.objects_created.fetch_add(1, Ordering::Relaxed);
        debug!(name = obj.name(), "point added");
        Ok(obj)
    }

    /// 按名字移除一个对象
    ///
    /// 移除前先释放对象的发布句柄；机器人条目受保护。
    ///
    /// # 返回
    ///
    /// - `Ok(true)`: 对象存在且已移除
    /// - `Ok(false)`: 无此名字
    ///
    /// # 错误
    ///
    /// - [`FieldError::RobotReserved`]: 试图移除机器人条目
    pub fn remove_object(&self, name: &str) -> Result<bool, FieldError> {
        if name == ROBOT_NAME {
            return Err(FieldError::RobotReserved(name.to_string()));
        }

        let removed = {
            let mut inner = self.lock_inner();
            inner
                .objects
                .iter()
                .position(|o| o.name() == name)
                .map(|idx| inner.objects.remove(idx))
        };

        match removed {
            Some(obj) => {
                // 先释放句柄，再丢弃对象
                if let Err(e) = obj.detach() {
                    warn!(name, error = %e, "handle close on remove failed");
                }
                self.metrics.objects_removed.fetch_add(1, Ordering::Relaxed);
                debug!(name, "field object removed");
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// 清空所有标记点，只保留机器人条目
    ///
    /// 每个被移除对象的句柄恰好关闭一次；关闭失败只记日志，
    /// 不中断清空。
    pub fn clear_points(&self) {
        let removed: Vec<Arc<FieldObject>> = {
            let mut inner = self.lock_inner();
            inner.objects.drain(1..).collect()
        };

        for obj in &removed {
            if let Err(e) = obj.detach() {
                warn!(name = obj.name(), error = %e, "handle close on clear failed");
            }
        }
        self.metrics.objects_removed.fetch_add(removed.len() as u64, Ordering::Relaxed);
        debug!(count = removed.len(), "points cleared");
    }

    // ==================== 附着协议 ====================

    /// 附着遥测 sink（延迟附着协议的入口，由周边框架调用）
    ///
    /// 在单个临界区内完成：记录 sink → 按插入序遍历当前成员 →
    /// 逐个附着（打开句柄 + 发布当前位姿）。临界区与
    /// `object()` / `add_point()` 互斥，因此附着开始时在册的对象
    /// 必被本次遍历附着，之后加入的对象由创建路径自行附着——
    /// 绝不漏附、绝不重复（对象侧附着幂等）。
    ///
    /// 状态机 `Unattached → Attached` 只迁移一次。重复调用不更换
    /// sink，只对当前成员重跑一遍幂等附着（容忍保守重试）；
    /// 新传入的 sink 被忽略并告警。
    ///
    /// 单个对象的附着失败只记日志：该对象留在未附着状态，等待
    /// 下一次调用重试。
    ///
    /// 析构后的调用被忽略：句柄已全部释放，不再记录 sink、
    /// 不再打开任何句柄（判定在临界区内，与并发的 [`Field::close`]
    /// 串行化）。
    pub fn attach_sink(&self, sink: Arc<dyn TelemetrySink>) {
        {
            let mut inner = self.lock_inner();
            if self.closed.load(Ordering::Acquire) {
                warn!(label = %self.label, "attach after teardown ignored");
                return;
            }

            let active = match &inner.sink {
                Some(existing) => {
                    warn!(label = %self.label, "sink already attached; re-running attach pass");
                    Arc::clone(existing)
                },
                None => {
                    inner.sink = Some(Arc::clone(&sink));
                    self.state.set(SinkState::Attached, Ordering::Release);
                    info!(label = %self.label, objects = inner.objects.len(), "sink attached");
                    sink
                },
            };

            for obj in &inner.objects {
                if let Err(e) = obj.attach(active.as_ref()) {
                    warn!(name = obj.name(), error = %e, "attach pass failed for object");
                }
            }
        }

        self.metrics.attach_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// 当前附着状态（无锁查询）
    pub fn sink_state(&self) -> SinkState {
        self.state.get(Ordering::Acquire)
    }

    /// 是否已附着
    pub fn is_attached(&self) -> bool {
        self.sink_state().is_attached()
    }

    // ==================== 诊断 ====================

    /// 当前成员名列表（按插入序）
    pub fn object_names(&self) -> Vec<String> {
        self.lock_inner().objects.iter().map(|o| o.name().to_string()).collect()
    }

    /// 当前成员数（机器人条目计入，恒 ≥ 1）
    pub fn object_count(&self) -> usize {
        self.lock_inner().objects.len()
    }

    /// 获取性能指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 登记标签
    pub fn label(&self) -> &str {
        &self.label
    }

    // ==================== 析构 ====================

    /// 析构：释放全部句柄并从注册服务注销
    ///
    /// 按插入序的逆序释放每个对象的句柄（后创建先释放）。
    /// 绝不中途放弃：能关的全部关闭，失败聚合上报。幂等，
    /// 第二次及之后的调用是空操作。析构是终态：之后的
    /// [`Field::attach_sink`] 被忽略，对象的位姿仍可读写但不再发布。
    ///
    /// # 错误
    ///
    /// - [`FieldError::Teardown`]: 部分句柄关闭失败（已尽力释放其余）
    pub fn close(&self) -> Result<(), FieldError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let objects = {
            let mut inner = self.lock_inner();
            // 摘除 sink，析构后创建的对象不再附着；
            // 无锁镜像同步回退，诊断查询不再报告已失效的附着
            inner.sink = None;
            self.state.set(SinkState::Unattached, Ordering::Release);
            inner.objects.clone()
        };

        let mut failed = 0usize;
        for obj in objects.iter().rev() {
            if let Err(e) = obj.detach() {
                error!(name = obj.name(), error = %e, "handle close on teardown failed");
                failed += 1;
            }
        }

        self.registrar.unregister(&self.label);
        info!(label = %self.label, failed, "field registry closed");

        if failed > 0 {
            Err(FieldError::Teardown { failed })
        } else {
            Ok(())
        }
    }

    /// 获取注册表锁，毒化时恢复内部值
    ///
    /// 每个变更路径都在单个临界区内保持成员不变量成立，
    /// 毒化只意味着某个持锁线程 panic，内部值仍然结构完整。
    fn lock_inner(&self) -> MutexGuard<'_, FieldInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        // 最后防线：显式 close 过则为空操作
        if let Err(e) = self.close() {
            error!(label = %self.label, error = %e, "field teardown completed with failures");
        }
    }
}
