// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use tempfile::NamedTempFile;

use magic_mover::api::{ApiError, ItemApi, MissionLogApi, MoverApi};
use magic_mover::app::AppState;
use magic_mover::config::ConfigManager;
use magic_mover::domain::{Item, Mover};

pub use test_helpers::{item_payload, mover_payload};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub mover_api: Arc<MoverApi>,
    pub item_api: Arc<ItemApi>,
    pub mission_log_api: Arc<MissionLogApi>,
    pub config_manager: Arc<ConfigManager>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的测试环境
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        magic_mover::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            mover_api: state.mover_api,
            item_api: state.item_api,
            mission_log_api: state.mission_log_api,
            config_manager: state.config_manager,
            _temp_file: temp_file,
        })
    }

    // ==========================================
    // 测试数据准备
    // ==========================================

    pub fn create_mover(&self, name: &str, weight_limit: f64) -> Mover {
        self.mover_api
            .create_mover(&mover_payload(name, weight_limit))
            .expect("创建搬运者失败")
    }

    pub fn create_item(&self, name: &str, weight: f64) -> Item {
        self.item_api
            .create_item(&item_payload(name, weight))
            .expect("创建物品失败")
    }

    /// 完成 n 次完整任务循环（装载 → 出发 → 返回）
    pub fn run_missions(&self, mover_id: &str, item_id: &str, n: usize) {
        for _ in 0..n {
            self.mover_api.load_cargo(mover_id, item_id).expect("装载失败");
            self.mover_api.start_mission(mover_id).expect("出发失败");
            self.mover_api.end_mission(mover_id).expect("返回失败");
        }
    }
}

// ==========================================
// 断言辅助函数
// ==========================================

/// 断言是 NotFound 错误
pub fn assert_not_found_error<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::NotFound(_)) => {}
        other => panic!("期望 NotFound 错误，实际: {:?}", other),
    }
}

/// 断言是状态转换错误，并返回原因
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: Result<T, ApiError>) -> String {
    match result {
        Err(ApiError::InvalidStateTransition { reason, .. }) => reason,
        other => panic!("期望 InvalidStateTransition 错误，实际: {:?}", other),
    }
}

/// 断言是载重超限错误
pub fn assert_capacity_exceeded<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::CapacityExceeded { .. }) => {}
        other => panic!("期望 CapacityExceeded 错误，实际: {:?}", other),
    }
}

/// 断言是校验错误，并返回消息
pub fn assert_validation_error<T: std::fmt::Debug>(result: Result<T, ApiError>) -> String {
    match result {
        Err(ApiError::ValidationFailed(violation)) => violation.message,
        other => panic!("期望 ValidationFailed 错误，实际: {:?}", other),
    }
}

/// 断言是查询参数错误
pub fn assert_invalid_query<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::InvalidQuery(_)) => {}
        other => panic!("期望 InvalidQuery 错误，实际: {:?}", other),
    }
}
