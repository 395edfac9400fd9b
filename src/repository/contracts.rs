// ==========================================
// 魔法搬运调度系统 - 仓储接口 (Trait)
// ==========================================
// 职责: 定义引擎与 API 依赖的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// 实现者: ItemRepository / MoverRepository / MissionLogRepository（rusqlite）
// ==========================================

use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::domain::mission_log::{MissionLogEntry, MissionLogPatch, NewMissionLog};
use crate::domain::mover::{Mover, MoverPatch, NewMover};
use crate::repository::error::RepositoryResult;
use crate::repository::query::{ListOptions, PaginatedResult, QueryFilter};

// ==========================================
// ItemStore
// ==========================================
pub trait ItemStore: Send + Sync {
    /// 新建物品，返回带 ID 的记录
    fn create(&self, data: &NewItem) -> RepositoryResult<Item>;

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Item>>;

    /// 分页查询
    ///
    /// # 错误
    /// - InvalidQuery: 未知字段、类型错误、分页参数 ≤ 0、无效排序
    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<Item>>;

    /// 部分更新，记录不存在时返回 None
    fn update_by_id(&self, id: &str, patch: &ItemPatch) -> RepositoryResult<Option<Item>>;

    /// 删除并返回被删除的记录
    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<Item>>;
}

// ==========================================
// MoverStore
// ==========================================
pub trait MoverStore: Send + Sync {
    /// 新建搬运者（初始状态 resting，货物为空，任务次数 0）
    fn create(&self, data: &NewMover) -> RepositoryResult<Mover>;

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Mover>>;

    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<Mover>>;

    /// 更新基础信息（名称 / 载重上限），revision +1
    fn update_by_id(&self, id: &str, patch: &MoverPatch) -> RepositoryResult<Option<Mover>>;

    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<Mover>>;

    /// 持久化状态转换快照
    ///
    /// 条件更新: 仅当库中 revision 等于 snapshot.revision 时写入，并将 revision +1
    ///
    /// # 错误
    /// - OptimisticLockFailure: 其他写入者已先行修改
    /// - NotFound: 记录已被删除
    fn save_transition(&self, snapshot: &Mover) -> RepositoryResult<Mover>;

    /// 按任务次数降序列出全部搬运者（同次数保持插入顺序）
    fn list_by_mission_count(&self) -> RepositoryResult<Vec<Mover>>;
}

// ==========================================
// MissionLogStore
// ==========================================
pub trait MissionLogStore: Send + Sync {
    /// 追加一条日志（时间戳由仓储生成）
    fn create(&self, data: &NewMissionLog) -> RepositoryResult<MissionLogEntry>;

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>>;

    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<MissionLogEntry>>;

    /// 纠错更新（引擎不调用）
    fn update_by_id(
        &self,
        id: &str,
        patch: &MissionLogPatch,
    ) -> RepositoryResult<Option<MissionLogEntry>>;

    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>>;
}
