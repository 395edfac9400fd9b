// ==========================================
// 魔法搬运调度系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，避免并发写入时无限等待
// - 幂等建表（搬运者 / 物品 / 任务日志 / 配置）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 只做提示，不做自动迁移。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式（UTC，微秒精度）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等创建全部表与索引
///
/// 约束说明：
/// - magic_mover 的 CHECK 约束是载重不变量的最后一道防线
///   （cargo_weight ≤ weight_limit；resting 状态货物必须为空）
/// - mission_log 不对 magic_mover 建外键：删除搬运者不级联删除日志
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS magic_item (
            item_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            weight REAL NOT NULL CHECK (weight >= 0),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS magic_mover (
            mover_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            weight_limit REAL NOT NULL CHECK (weight_limit > 0),
            current_state TEXT NOT NULL
                CHECK (current_state IN ('resting', 'loading', 'on-mission')),
            cargo_json TEXT NOT NULL DEFAULT '[]',
            cargo_weight REAL NOT NULL DEFAULT 0,
            mission_count INTEGER NOT NULL DEFAULT 0 CHECK (mission_count >= 0),
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (cargo_weight <= weight_limit),
            CHECK (current_state <> 'resting' OR cargo_json = '[]')
        );

        CREATE TABLE IF NOT EXISTS mission_log (
            log_id TEXT PRIMARY KEY,
            mover_id TEXT NOT NULL,
            activity TEXT NOT NULL
                CHECK (activity IN ('resting', 'loading', 'on-mission')),
            log_ts TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_mover_mission_count ON magic_mover(mission_count DESC);
        CREATE INDEX IF NOT EXISTS idx_mover_state ON magic_mover(current_state);
        CREATE INDEX IF NOT EXISTS idx_mission_log_mover_ts ON mission_log(mover_id, log_ts);
        CREATE INDEX IF NOT EXISTS idx_mission_log_activity ON mission_log(activity);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema 初始化完成");
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_absent_before_init() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_check_constraint_rejects_overloaded_mover() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            r#"
            INSERT INTO magic_mover (
                mover_id, name, weight_limit, current_state, cargo_json,
                cargo_weight, mission_count, revision, created_at, updated_at
            ) VALUES ('m1', 'Overloaded', 10, 'loading', '[{"itemId":"i1","weight":11}]',
                      11, 0, 0, '2026-01-01 00:00:00', '2026-01-01 00:00:00')
            "#,
            [],
        );

        assert!(result.is_err());
    }
}
