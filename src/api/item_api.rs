// ==========================================
// 魔法搬运调度系统 - 物品 API
// ==========================================
// 职责: 物品 CRUD
// 说明: 已装载的货物条目复制了重量，修改/删除物品不影响搬运者
// ==========================================

use std::sync::Arc;

use serde_json::Value;

use crate::api::common::{decode_payload, parse_filter, ListRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_min, PayloadValidator, ValidationMode, ITEM_SCHEMA};
use crate::config::ConfigManager;
use crate::domain::item::{Item, ItemPatch, NewItem};
use crate::repository::{ItemStore, PaginatedResult};

pub struct ItemApi {
    item_store: Arc<dyn ItemStore>,
    config: Arc<ConfigManager>,
}

impl ItemApi {
    pub fn new(item_store: Arc<dyn ItemStore>, config: Arc<ConfigManager>) -> Self {
        Self { item_store, config }
    }

    fn validate(&self, payload: &Value, mode: ValidationMode) -> ApiResult<()> {
        PayloadValidator::new(self.config.get_allow_unknown_fields()?)
            .validate(payload, ITEM_SCHEMA, mode)?;
        require_min(payload, "weight", 0.0)?;
        Ok(())
    }

    pub fn create_item(&self, payload: &Value) -> ApiResult<Item> {
        self.validate(payload, ValidationMode::Strict)?;
        let data: NewItem = decode_payload(payload)?;
        Ok(self.item_store.create(&data)?)
    }

    pub fn get_item(&self, id: &str) -> ApiResult<Item> {
        self.item_store.find_by_id(id)?.ok_or_else(|| not_found(id))
    }

    pub fn list_items(
        &self,
        filter: &Value,
        request: &ListRequest,
    ) -> ApiResult<PaginatedResult<Item>> {
        let filter = parse_filter(filter)?;
        let options = request.to_options(self.config.get_default_page_limit()?);
        Ok(self.item_store.find_many(&filter, &options)?)
    }

    pub fn update_item(&self, id: &str, payload: &Value) -> ApiResult<Item> {
        self.validate(payload, ValidationMode::Partial)?;
        let patch: ItemPatch = decode_payload(payload)?;
        self.item_store
            .update_by_id(id, &patch)?
            .ok_or_else(|| not_found(id))
    }

    pub fn delete_item(&self, id: &str) -> ApiResult<Item> {
        self.item_store.delete_by_id(id)?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Item(id={})不存在", id))
}
