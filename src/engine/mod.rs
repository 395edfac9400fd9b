// ==========================================
// 魔法搬运调度系统 - 引擎层
// ==========================================
// 职责: 实现生命周期规则,不拼 SQL
// 红线: Engine 不拼 SQL, 所有拒绝必须输出 reason
// ==========================================

pub mod error;
pub mod mover_lifecycle;
pub mod ranking;
pub mod repositories;

// 重导出核心引擎
pub use error::{LifecycleError, LifecycleResult};
pub use mover_lifecycle::MoverLifecycleEngine;
pub use ranking::MoverRanking;
pub use repositories::LifecycleRepositories;
