// ==========================================
// 魔法搬运调度系统 - 物品数据仓储
// ==========================================
// 对齐: magic_item 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::TIMESTAMP_FORMAT;
use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::repository::contracts::ItemStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{
    fetch_page, FieldDef, FieldKind, ListOptions, PaginatedResult, QueryFilter,
};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "item_id, name, weight";

/// 可过滤/排序字段
const ITEM_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "item_id", FieldKind::Identifier),
    FieldDef::new("name", "name", FieldKind::Text),
    FieldDef::new("weight", "weight", FieldKind::Number),
];

// ==========================================
// ItemRepository - 物品仓储
// ==========================================
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            weight: row.get(2)?,
        })
    }

    fn query_by_id(conn: &Connection, id: &str) -> RepositoryResult<Option<Item>> {
        let sql = format!("SELECT {} FROM magic_item WHERE item_id = ?1", ITEM_COLUMNS);
        match conn.query_row(&sql, params![id], Self::map_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ItemStore for ItemRepository {
    fn create(&self, data: &NewItem) -> RepositoryResult<Item> {
        let conn = self.get_conn()?;
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            weight: data.weight,
        };

        conn.execute(
            "INSERT INTO magic_item (item_id, name, weight, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                item.id,
                item.name,
                item.weight,
                Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;

        tracing::debug!(item_id = %item.id, weight = item.weight, "物品已创建");
        Ok(item)
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        Self::query_by_id(&conn, id)
    }

    fn find_many(
        &self,
        filter: &QueryFilter,
        options: &ListOptions,
    ) -> RepositoryResult<PaginatedResult<Item>> {
        let conn = self.get_conn()?;
        fetch_page(
            &conn,
            "magic_item",
            ITEM_COLUMNS,
            ITEM_FIELDS,
            filter,
            options,
            Self::map_row,
        )
    }

    fn update_by_id(&self, id: &str, patch: &ItemPatch) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE magic_item
            SET name = COALESCE(?1, name),
                weight = COALESCE(?2, weight)
            WHERE item_id = ?3
            "#,
            params![patch.name, patch.weight, id],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::query_by_id(&conn, id)
    }

    fn delete_by_id(&self, id: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;

        let existing = Self::query_by_id(&conn, id)?;
        if existing.is_some() {
            conn.execute("DELETE FROM magic_item WHERE item_id = ?1", params![id])?;
        }
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup_repo() -> ItemRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ItemRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn new_item(name: &str, weight: f64) -> NewItem {
        NewItem {
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn test_create_and_find_by_id() {
        let repo = setup_repo();
        let item = repo.create(&new_item("Anvil", 120.0)).unwrap();

        let found = repo.find_by_id(&item.id).unwrap().unwrap();
        assert_eq!(found, item);
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_partial_fields() {
        let repo = setup_repo();
        let item = repo.create(&new_item("Anvil", 120.0)).unwrap();

        let patch = ItemPatch {
            name: None,
            weight: Some(80.0),
        };
        let updated = repo.update_by_id(&item.id, &patch).unwrap().unwrap();
        assert_eq!(updated.name, "Anvil");
        assert_eq!(updated.weight, 80.0);

        assert!(repo.update_by_id("missing", &patch).unwrap().is_none());
    }

    #[test]
    fn test_delete_returns_removed_record() {
        let repo = setup_repo();
        let item = repo.create(&new_item("Anvil", 120.0)).unwrap();

        let removed = repo.delete_by_id(&item.id).unwrap();
        assert_eq!(removed, Some(item.clone()));
        assert!(repo.find_by_id(&item.id).unwrap().is_none());
        assert!(repo.delete_by_id(&item.id).unwrap().is_none());
    }

    #[test]
    fn test_negative_weight_rejected_by_store() {
        let repo = setup_repo();
        let result = repo.create(&new_item("Ghost", -1.0));
        assert!(matches!(
            result,
            Err(RepositoryError::CheckConstraintViolation(_))
        ));
    }

    #[test]
    fn test_find_many_filter_and_sort() {
        let repo = setup_repo();
        repo.create(&new_item("Iron Box", 10.0)).unwrap();
        repo.create(&new_item("feather", 0.1)).unwrap();
        repo.create(&new_item("iron bar", 30.0)).unwrap();

        let filter = json!({"name": "IRON"}).as_object().cloned().unwrap();
        let options = ListOptions::default().with_sort("weight:desc");
        let page = repo.find_many(&filter, &options).unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<_> = page.results.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["iron bar", "Iron Box"]);
    }
}
