// ==========================================
// 魔法搬运调度系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// 列表默认每页条数
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let config_map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<String, String>>>()?;

        Ok(serde_json::to_string(&config_map)?)
    }

    // ===== 列表查询配置 =====

    /// 获取列表默认每页条数
    ///
    /// 配置缺失或非法（非整数 / ≤ 0）时回退到 10
    pub fn get_default_page_limit(&self) -> RepositoryResult<i64> {
        let raw = match self.get_global_config_value(config_keys::DEFAULT_PAGE_LIMIT)? {
            Some(v) => v,
            None => return Ok(DEFAULT_PAGE_LIMIT),
        };

        match raw.trim().parse::<i64>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => {
                tracing::warn!(
                    value = %raw,
                    "default_page_limit 配置非法, 使用默认值 {}",
                    DEFAULT_PAGE_LIMIT
                );
                Ok(DEFAULT_PAGE_LIMIT)
            }
        }
    }

    // ===== 校验配置 =====

    /// 是否允许负载中出现未声明字段（默认 false）
    pub fn get_allow_unknown_fields(&self) -> RepositoryResult<bool> {
        let value = self.get_global_config_value(config_keys::ALLOW_UNKNOWN_FIELDS)?;
        Ok(matches!(
            value.as_deref().map(str::trim),
            Some("true") | Some("1")
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 列表查询
    pub const DEFAULT_PAGE_LIMIT: &str = "list.default_page_limit";

    // 负载校验
    pub const ALLOW_UNKNOWN_FIELDS: &str = "validation.allow_unknown_fields";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(config.get_default_page_limit().unwrap(), 10);
        assert!(!config.get_allow_unknown_fields().unwrap());
        assert_eq!(config.get_config_snapshot().unwrap(), "{}");
    }

    #[test]
    fn test_set_and_override() {
        let config = setup();
        config
            .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, "25")
            .unwrap();
        assert_eq!(config.get_default_page_limit().unwrap(), 25);

        config
            .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, "50")
            .unwrap();
        assert_eq!(config.get_default_page_limit().unwrap(), 50);

        config
            .set_global_config_value(config_keys::ALLOW_UNKNOWN_FIELDS, "true")
            .unwrap();
        assert!(config.get_allow_unknown_fields().unwrap());
    }

    #[test]
    fn test_invalid_page_limit_falls_back() {
        let config = setup();
        for raw in ["0", "-3", "many"] {
            config
                .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, raw)
                .unwrap();
            assert_eq!(config.get_default_page_limit().unwrap(), DEFAULT_PAGE_LIMIT);
        }
    }

    #[test]
    fn test_snapshot_lists_all_global_keys() {
        let config = setup();
        config
            .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, "20")
            .unwrap();
        config
            .set_global_config_value(config_keys::ALLOW_UNKNOWN_FIELDS, "false")
            .unwrap();

        let snapshot: serde_json::Value =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["list.default_page_limit"], "20");
        assert_eq!(snapshot["validation.allow_unknown_fields"], "false");
    }
}
