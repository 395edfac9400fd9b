// ==========================================
// 魔法搬运调度系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 装配: 显式构造参数传递，不使用全局容器
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ItemApi, MissionLogApi, MoverApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{LifecycleRepositories, MoverLifecycleEngine, MoverRanking};
use crate::repository::{
    ItemRepository, ItemStore, MissionLogRepository, MissionLogStore, MoverRepository, MoverStore,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "MAGIC_MOVER_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 搬运者API
    pub mover_api: Arc<MoverApi>,

    /// 物品API
    pub item_api: Arc<ItemApi>,

    /// 任务日志API
    pub mission_log_api: Arc<MissionLogApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 打开连接、建表（幂等）后装配全部组件
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已有连接装配（连接需已完成建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let mover_store: Arc<dyn MoverStore> = Arc::new(MoverRepository::new(conn.clone()));
        let item_store: Arc<dyn ItemStore> = Arc::new(ItemRepository::new(conn.clone()));
        let mission_log_store: Arc<dyn MissionLogStore> =
            Arc::new(MissionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let lifecycle = Arc::new(MoverLifecycleEngine::new(LifecycleRepositories::new(
            mover_store.clone(),
            item_store.clone(),
            mission_log_store.clone(),
        )));
        let ranking = Arc::new(MoverRanking::new(mover_store.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let mover_api = Arc::new(MoverApi::new(
            mover_store,
            lifecycle,
            ranking,
            config_manager.clone(),
        ));
        let item_api = Arc::new(ItemApi::new(item_store, config_manager.clone()));
        let mission_log_api = Arc::new(MissionLogApi::new(
            mission_log_store,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            mover_api,
            item_api,
            mission_log_api,
            config_manager,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 MAGIC_MOVER_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/magic-mover-dev/magic_mover.db
/// - 生产环境: 用户数据目录/magic-mover/magic_mover.db
/// - 无用户数据目录时: ./magic_mover.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./magic_mover.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("magic-mover-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("magic-mover");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("magic_mover.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {:?}: {}，使用当前目录", dir, e),
        }
    }

    path.to_string_lossy().to_string()
}
