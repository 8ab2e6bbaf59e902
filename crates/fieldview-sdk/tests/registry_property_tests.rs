//! 注册表不变量属性测试
//!
//! 用随机操作序列验证注册表的结构不变量：
//! 1. 机器人条目恒存且恒在序列首位
//! 2. 名字全局唯一
//! 3. 附着后每个在册对象恰好一个打开的句柄
//! 4. 位姿往返无损

use fieldview_sdk::{Field, MemorySink, Pose2d};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// 随机操作
#[derive(Debug, Clone)]
enum FieldOp {
    AddPoint { x: f64, y: f64, deg: f64 },
    GetOrCreate { idx: u8 },
    Remove { idx: u8 },
    ClearPoints,
    AttachSink,
}

const NAME_POOL: [&str; 5] = ["A", "B", "C", "D", "E"];

fn op_strategy() -> impl Strategy<Value = FieldOp> {
    prop_oneof![
        (-50.0..50.0f64, -50.0..50.0f64, -360.0..360.0f64)
            .prop_map(|(x, y, deg)| FieldOp::AddPoint { x, y, deg }),
        (0u8..5).prop_map(|idx| FieldOp::GetOrCreate { idx }),
        (0u8..5).prop_map(|idx| FieldOp::Remove { idx }),
        Just(FieldOp::ClearPoints),
        Just(FieldOp::AttachSink),
    ]
}

proptest! {
    #[test]
    fn registry_invariants_hold_for_any_op_sequence(
        ops in prop::collection::vec(op_strategy(), 0..40)
    ) {
        let field = Field::new();
        let sink = MemorySink::new();
        let mut attached = false;

        for op in ops {
            match op {
                FieldOp::AddPoint { x, y, deg } => {
                    field.add_point(Pose2d::from_xy_degrees(x, y, deg)).unwrap();
                },
                FieldOp::GetOrCreate { idx } => {
                    field.object(NAME_POOL[idx as usize]);
                },
                FieldOp::Remove { idx } => {
                    field.remove_object(NAME_POOL[idx as usize]).unwrap();
                },
                FieldOp::ClearPoints => {
                    field.clear_points();
                },
                FieldOp::AttachSink => {
                    field.attach_sink(Arc::new(sink.clone()));
                    attached = true;
                },
            }

            // 每步之后：机器人在首位，名字唯一
            let names = field.object_names();
            prop_assert_eq!(&names[0], "Robot");
            let unique: HashSet<&String> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
        }

        // 收敛后：附着则每个在册对象恰好一个句柄
        if attached {
            for name in field.object_names() {
                prop_assert_eq!(sink.open_handles(&name), 1, "object {}", name);
            }
        }
    }

    #[test]
    fn robot_pose_round_trip_is_lossless(
        x in -100.0..100.0f64,
        y in -100.0..100.0f64,
        deg in -720.0..720.0f64,
    ) {
        let field = Field::new();
        let pose = Pose2d::from_xy_degrees(x, y, deg);
        field.set_robot_pose(pose).unwrap();
        prop_assert_eq!(field.robot_pose(), pose);
        prop_assert_eq!(pose.to_sink_values(), [x, y, deg]);
    }
}
