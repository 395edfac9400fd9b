// ==========================================
// 魔法搬运调度系统 - 搬运者 API
// ==========================================
// 职责: 搬运者 CRUD、生命周期操作、排行
// 红线: 负载校验失败不进入仓储/引擎；状态与货物只经引擎修改
// ==========================================

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::api::common::{decode_payload, parse_filter, ListRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_positive, PayloadValidator, ValidationMode, MOVER_SCHEMA};
use crate::config::ConfigManager;
use crate::domain::mover::{Mover, MoverPatch, NewMover, TransitionError};
use crate::engine::{MoverLifecycleEngine, MoverRanking};
use crate::repository::{MoverStore, PaginatedResult};

// ==========================================
// MoverApi - 搬运者 API
// ==========================================
pub struct MoverApi {
    mover_store: Arc<dyn MoverStore>,
    lifecycle: Arc<MoverLifecycleEngine>,
    ranking: Arc<MoverRanking>,
    config: Arc<ConfigManager>,
}

impl MoverApi {
    pub fn new(
        mover_store: Arc<dyn MoverStore>,
        lifecycle: Arc<MoverLifecycleEngine>,
        ranking: Arc<MoverRanking>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            mover_store,
            lifecycle,
            ranking,
            config,
        }
    }

    fn validator(&self) -> ApiResult<PayloadValidator> {
        Ok(PayloadValidator::new(self.config.get_allow_unknown_fields()?))
    }

    // ==========================================
    // CRUD
    // ==========================================

    /// 创建搬运者（初始 resting，无货物）
    pub fn create_mover(&self, payload: &Value) -> ApiResult<Mover> {
        self.validator()?.validate(payload, MOVER_SCHEMA, ValidationMode::Strict)?;
        require_positive(payload, "weightLimit")?;

        let data: NewMover = decode_payload(payload)?;
        let mover = self.mover_store.create(&data)?;
        debug!(mover_id = %mover.id, "create_mover 完成");
        Ok(mover)
    }

    pub fn get_mover(&self, id: &str) -> ApiResult<Mover> {
        self.mover_store
            .find_by_id(id)?
            .ok_or_else(|| not_found(id))
    }

    /// 分页查询
    ///
    /// # 过滤
    /// - name: 大小写不敏感子串
    /// - id / state: 精确匹配
    /// - weightLimit / missionCount: 数值相等
    pub fn list_movers(
        &self,
        filter: &Value,
        request: &ListRequest,
    ) -> ApiResult<PaginatedResult<Mover>> {
        let filter = parse_filter(filter)?;
        let options = request.to_options(self.config.get_default_page_limit()?);
        Ok(self.mover_store.find_many(&filter, &options)?)
    }

    /// 更新名称 / 载重上限
    ///
    /// 新上限低于当前货物总重 → CapacityExceeded
    pub fn update_mover(&self, id: &str, payload: &Value) -> ApiResult<Mover> {
        self.validator()?.validate(payload, MOVER_SCHEMA, ValidationMode::Partial)?;
        require_positive(payload, "weightLimit")?;

        let patch: MoverPatch = decode_payload(payload)?;
        let current = self.get_mover(id)?;
        current
            .apply_patch(&patch)
            .map_err(|e| capacity_error(id, e))?;

        self.mover_store
            .update_by_id(id, &patch)?
            .ok_or_else(|| not_found(id))
    }

    /// 删除搬运者（日志保留）
    pub fn delete_mover(&self, id: &str) -> ApiResult<Mover> {
        self.mover_store
            .delete_by_id(id)?
            .ok_or_else(|| not_found(id))
    }

    // ==========================================
    // 生命周期
    // ==========================================

    pub fn load_cargo(&self, mover_id: &str, item_id: &str) -> ApiResult<Mover> {
        Ok(self.lifecycle.load_cargo(mover_id, item_id)?)
    }

    pub fn start_mission(&self, mover_id: &str) -> ApiResult<Mover> {
        Ok(self.lifecycle.start_mission(mover_id)?)
    }

    pub fn end_mission(&self, mover_id: &str) -> ApiResult<Mover> {
        Ok(self.lifecycle.end_mission(mover_id)?)
    }

    // ==========================================
    // 排行
    // ==========================================

    /// 按任务次数降序列出全部搬运者
    pub fn list_top_movers(&self) -> ApiResult<Vec<Mover>> {
        Ok(self.ranking.top_movers()?)
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Mover(id={})不存在", id))
}

fn capacity_error(mover_id: &str, err: TransitionError) -> ApiError {
    match err {
        TransitionError::CapacityExceeded {
            weight_limit,
            current_weight,
            requested_weight,
        } => ApiError::CapacityExceeded {
            mover_id: mover_id.to_string(),
            weight_limit,
            current_weight,
            requested_weight,
        },
        other => ApiError::InternalError(other.to_string()),
    }
}
