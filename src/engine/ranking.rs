// ==========================================
// 魔法搬运调度系统 - 搬运者排行
// ==========================================
// 规则: 按任务次数降序，同次数保持插入顺序
// 只读，不分页
// ==========================================

use crate::domain::mover::Mover;
use crate::repository::{MoverStore, RepositoryResult};
use std::sync::Arc;

pub struct MoverRanking {
    mover_store: Arc<dyn MoverStore>,
}

impl MoverRanking {
    pub fn new(mover_store: Arc<dyn MoverStore>) -> Self {
        Self { mover_store }
    }

    /// 全部搬运者按任务次数排名
    pub fn top_movers(&self) -> RepositoryResult<Vec<Mover>> {
        let movers = self.mover_store.list_by_mission_count()?;
        tracing::debug!(count = movers.len(), "排行已生成");
        Ok(movers)
    }
}
