// ==========================================
// 魔法搬运调度系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod contracts;
pub mod error;
pub mod item_repo;
pub mod mission_log_repo;
pub mod mover_repo;
pub mod query;

// 重导出核心仓储
pub use contracts::{ItemStore, MissionLogStore, MoverStore};
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::ItemRepository;
pub use mission_log_repo::MissionLogRepository;
pub use mover_repo::MoverRepository;
pub use query::{ListOptions, PaginatedResult, QueryFilter, SortDirection, SortSpec};
