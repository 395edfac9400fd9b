// ==========================================
// 魔法搬运调度系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、状态转换规则
// 红线: 不含数据访问逻辑
// ==========================================

pub mod item;
pub mod mission_log;
pub mod mover;
pub mod types;

// 重导出核心类型
pub use item::{Item, ItemPatch, NewItem};
pub use mission_log::{MissionLogEntry, MissionLogPatch, NewMissionLog};
pub use mover::{CargoCapacity, CargoEntry, Mover, MoverPatch, NewMover, TransitionError};
pub use types::{LifecycleOperation, MoverState};
