use crate::db::TIMESTAMP_FORMAT;
use crate::domain::mission_log::{MissionLogEntry, MissionLogPatch, NewMissionLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{SubsecRound, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// MissionLogRepository - 任务日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct MissionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MissionLogRepository {
    /// 创建新的任务日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 追加日志
    ///
    /// # 返回
    /// - `Ok(entry)`: 带 ID 与时间戳的日志
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, data: &NewMissionLog) -> RepositoryResult<MissionLogEntry> {
        let conn = self.get_conn()?;

        let entry = MissionLogEntry {
            id: Uuid::new_v4().to_string(),
            mover_id: data.mover_id.clone(),
            activity: data.activity,
            timestamp: Utc::now().naive_utc().trunc_subsecs(6), // 与存储精度一致
        };

        conn.execute(
            "INSERT INTO mission_log (log_id, mover_id, activity, log_ts) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id,
                entry.mover_id,
                entry.activity.as_str(),
                entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;

        Ok(entry)
    }

    /// 纠错更新（搬运者引用 / 活动类型），时间戳保持不变
    pub fn correct(
        &self,
        id: &str,
        patch: &MissionLogPatch,
    ) -> RepositoryResult<Option<MissionLogEntry>> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE mission_log
            SET mover_id = COALESCE(?1, mover_id),
                activity = COALESCE(?2, activity)
            WHERE log_id = ?3
            "#,
            params![patch.mover_id, patch.activity.map(|a| a.as_str()), id],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::query_by_id(&conn, id)
    }

    /// 删除日志，返回被删除的记录
    pub fn remove(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>> {
        let conn = self.get_conn()?;

        let existing = Self::query_by_id(&conn, id)?;
        if existing.is_some() {
            conn.execute("DELETE FROM mission_log WHERE log_id = ?1", params![id])?;
        }
        Ok(existing)
    }
}
