use super::core::MissionLogRepository;
use crate::db::TIMESTAMP_FORMAT;
use crate::domain::mission_log::MissionLogEntry;
use crate::domain::types::MoverState;
use crate::repository::error::RepositoryResult;
use crate::repository::query::{
    fetch_page, FieldDef, FieldKind, ListOptions, PaginatedResult, QueryFilter,
};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};

const LOG_COLUMNS: &str = "log_id, mover_id, activity, log_ts";

/// 可过滤/排序字段
const LOG_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "log_id", FieldKind::Identifier),
    FieldDef::new("moverId", "mover_id", FieldKind::Identifier),
    FieldDef::new("activity", "activity", FieldKind::Enum(&MoverState::NAMES)),
    FieldDef::new("timestamp", "log_ts", FieldKind::Timestamp),
];

impl MissionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 log_id 查询单条日志
    pub fn find_entry(&self, id: &str) -> RepositoryResult<Option<MissionLogEntry>> {
        let conn = self.get_conn()?;
        Self::query_by_id(&conn, id)
    }

    /// 分页查询（默认按写入顺序）
    pub fn list_entries(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<MissionLogEntry>> {
        let conn = self.get_conn()?;
        fetch_page(
            &conn,
            "mission_log",
            LOG_COLUMNS,
            LOG_FIELDS,
            filter,
            options,
            Self::map_row,
        )
    }

    pub(super) fn query_by_id(
        conn: &Connection,
        id: &str,
    ) -> RepositoryResult<Option<MissionLogEntry>> {
        let sql = format!("SELECT {} FROM mission_log WHERE log_id = ?1", LOG_COLUMNS);
        match conn.query_row(&sql, params![id], Self::map_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 映射数据库行到 MissionLogEntry
    fn map_row(row: &Row<'_>) -> SqliteResult<MissionLogEntry> {
        let activity_text: String = row.get(2)?;
        let activity = MoverState::parse(&activity_text).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("未知的活动类型: {}", activity_text).into(),
            )
        })?;

        let ts_text: String = row.get(3)?;
        let timestamp = NaiveDateTime::parse_from_str(&ts_text, TIMESTAMP_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(MissionLogEntry {
            id: row.get(0)?,
            mover_id: row.get(1)?,
            activity,
            timestamp,
        })
    }
}
