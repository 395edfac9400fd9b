// ==========================================
// 魔法搬运调度系统 - 任务日志数据仓储
// ==========================================
// 对齐: mission_log 表
// 红线: 日志只追加；纠错更新由调用方显式发起
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use self::core::MissionLogRepository;

use crate::domain::mission_log::{MissionLogEntry, MissionLogPatch, NewMissionLog};
use crate::repository::contracts::MissionLogStore;
use crate::repository::error::RepositoryResult;
use crate::repository::query::{ListOptions, PaginatedResult, QueryFilter};

impl MissionLogStore for MissionLogRepository {
    fn create(&self, data: &NewMissionLog) -> RepositoryResult<MissionLogEntry> {
        self.insert(data)
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>> {
        self.find_entry(id)
    }

    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<MissionLogEntry>> {
        self.list_entries(filter, options)
    }

    fn update_by_id(
        &self,
        id: &str,
        patch: &MissionLogPatch,
    ) -> RepositoryResult<Option<MissionLogEntry>> {
        self.correct(id, patch)
    }

    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>> {
        self.remove(id)
    }
}
