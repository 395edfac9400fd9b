// ==========================================
// 魔法搬运调度系统 - 任务日志 API
// ==========================================
// 职责: 任务日志查询与纠错
// 红线: 引擎自动写入的日志之外，手工写入/修改都必须通过校验
// ==========================================

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::api::common::{decode_payload, parse_filter, ListRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    require_one_of, PayloadValidator, ValidationMode, MISSION_LOG_SCHEMA,
};
use crate::config::ConfigManager;
use crate::domain::mission_log::{MissionLogEntry, MissionLogPatch, NewMissionLog};
use crate::domain::types::MoverState;
use crate::repository::{MissionLogStore, PaginatedResult};

pub struct MissionLogApi {
    log_store: Arc<dyn MissionLogStore>,
    config: Arc<ConfigManager>,
}

impl MissionLogApi {
    pub fn new(log_store: Arc<dyn MissionLogStore>, config: Arc<ConfigManager>) -> Self {
        Self { log_store, config }
    }

    fn validate(&self, payload: &Value, mode: ValidationMode) -> ApiResult<()> {
        PayloadValidator::new(self.config.get_allow_unknown_fields()?)
            .validate(payload, MISSION_LOG_SCHEMA, mode)?;
        require_one_of(payload, "activity", &MoverState::NAMES)?;
        Ok(())
    }

    pub fn create_mission_log(&self, payload: &Value) -> ApiResult<MissionLogEntry> {
        self.validate(payload, ValidationMode::Strict)?;
        let data: NewMissionLog = decode_payload(payload)?;
        Ok(self.log_store.create(&data)?)
    }

    pub fn get_mission_log(&self, id: &str) -> ApiResult<MissionLogEntry> {
        self.log_store.find_by_id(id)?.ok_or_else(|| not_found(id))
    }

    /// 分页查询（moverId / activity 精确匹配，timestamp 前缀匹配）
    pub fn list_mission_logs(
        &self,
        filter: &Value,
        request: &ListRequest,
    ) -> ApiResult<PaginatedResult<MissionLogEntry>> {
        let filter = parse_filter(filter)?;
        let options = request.to_options(self.config.get_default_page_limit()?);
        Ok(self.log_store.find_many(&filter, &options)?)
    }

    /// 纠错更新
    pub fn update_mission_log(&self, id: &str, payload: &Value) -> ApiResult<MissionLogEntry> {
        self.validate(payload, ValidationMode::Partial)?;
        let patch: MissionLogPatch = decode_payload(payload)?;

        let corrected = self
            .log_store
            .update_by_id(id, &patch)?
            .ok_or_else(|| not_found(id))?;
        info!(log_id = %id, "任务日志已纠错");
        Ok(corrected)
    }

    pub fn delete_mission_log(&self, id: &str) -> ApiResult<MissionLogEntry> {
        self.log_store.delete_by_id(id)?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("MissionLog(id={})不存在", id))
}
