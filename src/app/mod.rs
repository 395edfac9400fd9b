// ==========================================
// 魔法搬运调度系统 - 应用层
// ==========================================
// 职责: 组件装配与默认路径
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
