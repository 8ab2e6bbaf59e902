//! 多线程场地遥测演示
//!
//! 演示注册表在多线程环境下的典型用法：
//! - 控制线程高频更新机器人位姿
//! - 标记线程动态添加/清空标记点
//! - 主线程在运行中途附着 sink（延迟附着协议生效）

use fieldview_sdk::{Field, MemorySink, Pose2d, SinkEvent, TracingRegistrar, init_logging};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    println!("🤖 Fieldview SDK - 多线程场地遥测演示");
    println!("==================================\n");

    // ==================== 步骤 1: 创建注册表 ====================
    println!("📡 步骤 1: 创建注册表（sink 尚未附着）...");

    let field = Arc::new(
        Field::builder()
            .robot_pose(Pose2d::from_xy_degrees(0.0, 0.0, 0.0))
            .registrar(Arc::new(TracingRegistrar))
            .label("DemoField")
            .build()?,
    );
    println!("   ✅ 注册表已创建，成员: {:?}\n", field.object_names());

    // ==================== 步骤 2: 启动控制线程 ====================
    println!("⚙️  步骤 2: 启动控制线程（100 Hz 更新机器人位姿）...");

    let control_field = Arc::clone(&field);
    let control_thread = thread::spawn(move || {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let mut i = 0u32;

        while start.elapsed() < Duration::from_secs(2) {
            let t = start.elapsed().as_secs_f64();
            let pose = Pose2d::from_xy_degrees(t.cos() * 2.0, t.sin() * 2.0, t.to_degrees());
            control_field.set_robot_pose(pose).expect("finite pose");
            i += 1;
            thread::sleep(period);
        }
        i
    });

    // ==================== 步骤 3: 启动标记线程 ====================
    println!("📍 步骤 3: 启动标记线程（添加/清空标记点）...");

    let marker_field = Arc::clone(&field);
    let marker_thread = thread::spawn(move || {
        for round in 0..5 {
            for k in 0..4 {
                marker_field
                    .add_point(Pose2d::from_xy_degrees(round as f64, k as f64, 0.0))
                    .expect("finite pose");
            }
            thread::sleep(Duration::from_millis(300));
            marker_field.clear_points();
        }
    });

    // ==================== 步骤 4: 运行中途附着 sink ====================
    thread::sleep(Duration::from_millis(500));
    println!("\n🔌 步骤 4: 附着遥测 sink（补齐此前注册的所有对象）...");

    let (sink, events) = MemorySink::with_events();
    field.attach_sink(Arc::new(sink.clone()));
    println!("   ✅ 已附着，当前成员: {:?}\n", field.object_names());

    // ==================== 步骤 5: 等待线程结束并汇总 ====================
    let updates = control_thread.join().expect("control thread panicked");
    marker_thread.join().expect("marker thread panicked");

    let published = events
        .try_iter()
        .filter(|e| matches!(e, SinkEvent::Published { .. }))
        .count();

    println!("📊 汇总:");
    println!("   控制线程位姿更新: {updates} 次");
    println!("   sink 收到发布:    {published} 次");
    println!("   机器人最终位置:   {:?}", sink.value("Robot"));
    println!("   指标: {:?}", field.metrics());

    field.close()?;
    println!("\n✅ 注册表已析构，所有句柄已释放");
    Ok(())
}
