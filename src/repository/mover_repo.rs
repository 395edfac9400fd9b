// ==========================================
// 魔法搬运调度系统 - 搬运者数据仓储
// ==========================================
// 对齐: magic_mover 表
// 并发控制: revision 乐观锁（条件更新，不持有跨调用的锁）
// 红线: Repository 不含业务逻辑，状态转换规则在领域层
// ==========================================

use crate::db::TIMESTAMP_FORMAT;
use crate::domain::mover::{CargoCapacity, CargoEntry, Mover, MoverPatch, NewMover};
use crate::domain::types::MoverState;
use crate::repository::contracts::MoverStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{
    fetch_page, FieldDef, FieldKind, ListOptions, PaginatedResult, QueryFilter,
};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const MOVER_COLUMNS: &str =
    "mover_id, name, weight_limit, current_state, cargo_json, mission_count, revision";

/// 可过滤/排序字段
const MOVER_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "mover_id", FieldKind::Identifier),
    FieldDef::new("name", "name", FieldKind::Text),
    FieldDef::new("weightLimit", "weight_limit", FieldKind::Number),
    FieldDef::new("state", "current_state", FieldKind::Enum(&MoverState::NAMES)),
    FieldDef::new("missionCount", "mission_count", FieldKind::Integer),
];

const ENTITY: &str = "Mover";

fn now_text() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

// ==========================================
// MoverRepository - 搬运者仓储
// ==========================================
pub struct MoverRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MoverRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Mover> {
        let state_text: String = row.get(3)?;
        let state = MoverState::parse(&state_text).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                format!("未知的搬运者状态: {}", state_text).into(),
            )
        })?;

        let cargo_json: String = row.get(4)?;
        let cargo: Vec<CargoEntry> = serde_json::from_str(&cargo_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
        })?;

        Ok(Mover {
            id: row.get(0)?,
            name: row.get(1)?,
            weight_limit: row.get(2)?,
            state,
            cargo,
            mission_count: row.get(5)?,
            revision: row.get(6)?,
        })
    }

    fn query_by_id(conn: &Connection, id: &str) -> RepositoryResult<Option<Mover>> {
        let sql = format!("SELECT {} FROM magic_mover WHERE mover_id = ?1", MOVER_COLUMNS);
        match conn.query_row(&sql, params![id], Self::map_row) {
            Ok(mover) => Ok(Some(mover)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn not_found(id: &str) -> RepositoryError {
        RepositoryError::NotFound {
            entity: ENTITY.to_string(),
            id: id.to_string(),
        }
    }
}

impl MoverStore for MoverRepository {
    fn create(&self, data: &NewMover) -> RepositoryResult<Mover> {
        let conn = self.get_conn()?;
        let mover = Mover {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            weight_limit: data.weight_limit,
            state: MoverState::Resting,
            cargo: Vec::new(),
            mission_count: 0,
            revision: 0,
        };
        let now = now_text();

        conn.execute(
            r#"
            INSERT INTO magic_mover (
                mover_id, name, weight_limit, current_state, cargo_json,
                cargo_weight, mission_count, revision, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, '[]', 0, 0, 0, ?5, ?5)
            "#,
            params![
                mover.id,
                mover.name,
                mover.weight_limit,
                mover.state.as_str(),
                now
            ],
        )?;

        tracing::debug!(mover_id = %mover.id, weight_limit = mover.weight_limit, "搬运者已创建");
        Ok(mover)
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Mover>> {
        let conn = self.get_conn()?;
        Self::query_by_id(&conn, id)
    }

    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<Mover>> {
        let conn = self.get_conn()?;
        fetch_page(
            &conn,
            "magic_mover",
            MOVER_COLUMNS,
            MOVER_FIELDS,
            filter,
            options,
            Self::map_row,
        )
    }

    fn update_by_id(&self, id: &str, patch: &MoverPatch) -> RepositoryResult<Option<Mover>> {
        let conn = self.get_conn()?;

        // 载重上限低于当前货物时由 CHECK 约束拒绝
        let rows = conn.execute(
            r#"
            UPDATE magic_mover
            SET name = COALESCE(?1, name),
                weight_limit = COALESCE(?2, weight_limit),
                revision = revision + 1,
                updated_at = ?3
            WHERE mover_id = ?4
            "#,
            params![patch.name, patch.weight_limit, now_text(), id],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::query_by_id(&conn, id)
    }

    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<Mover>> {
        let conn = self.get_conn()?;

        let existing = Self::query_by_id(&conn, id)?;
        if existing.is_some() {
            conn.execute("DELETE FROM magic_mover WHERE mover_id = ?1", params![id])?;
        }
        Ok(existing)
    }

    fn save_transition(&self, snapshot: &Mover) -> RepositoryResult<Mover> {
        let conn = self.get_conn()?;
        let cargo_json = serde_json::to_string(&snapshot.cargo)?;

        let rows = conn.execute(
            r#"
            UPDATE magic_mover
            SET name = ?1,
                weight_limit = ?2,
                current_state = ?3,
                cargo_json = ?4,
                cargo_weight = ?5,
                mission_count = ?6,
                revision = revision + 1,
                updated_at = ?7
            WHERE mover_id = ?8 AND revision = ?9
            "#,
            params![
                snapshot.name,
                snapshot.weight_limit,
                snapshot.state.as_str(),
                cargo_json,
                snapshot.cargo_weight(),
                snapshot.mission_count,
                now_text(),
                snapshot.id,
                snapshot.revision,
            ],
        )?;

        if rows == 0 {
            // 区分: 记录已删除 vs 版本冲突
            let actual: Option<i64> = conn
                .query_row(
                    "SELECT revision FROM magic_mover WHERE mover_id = ?1",
                    params![snapshot.id],
                    |row| row.get(0),
                )
                .optional()?;

            return match actual {
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    entity: ENTITY.to_string(),
                    id: snapshot.id.clone(),
                    expected: snapshot.revision,
                    actual,
                }),
                None => Err(Self::not_found(&snapshot.id)),
            };
        }

        Self::query_by_id(&conn, &snapshot.id)?.ok_or_else(|| Self::not_found(&snapshot.id))
    }

    fn list_by_mission_count(&self) -> RepositoryResult<Vec<Mover>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM magic_mover ORDER BY mission_count DESC, rowid ASC",
            MOVER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let movers = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(movers)
    }
}
