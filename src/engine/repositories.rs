// ==========================================
// 魔法搬运调度系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合生命周期引擎所需的仓储接口
// 依赖方向: 引擎只依赖 Trait，不依赖具体实现
// ==========================================

use std::sync::Arc;

use crate::repository::{ItemStore, MissionLogStore, MoverStore};

/// 生命周期引擎仓储集合
///
/// # 包含的仓储
/// - `mover_store`: 搬运者（读取 + 条件写入）
/// - `item_store`: 物品（只读）
/// - `mission_log_store`: 任务日志（只追加）
#[derive(Clone)]
pub struct LifecycleRepositories {
    pub mover_store: Arc<dyn MoverStore>,
    pub item_store: Arc<dyn ItemStore>,
    pub mission_log_store: Arc<dyn MissionLogStore>,
}

impl LifecycleRepositories {
    pub fn new(
        mover_store: Arc<dyn MoverStore>,
        item_store: Arc<dyn ItemStore>,
        mission_log_store: Arc<dyn MissionLogStore>,
    ) -> Self {
        Self {
            mover_store,
            item_store,
            mission_log_store,
        }
    }
}
