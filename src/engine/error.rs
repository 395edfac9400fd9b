// ==========================================
// 魔法搬运调度系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 所有拒绝必须携带原因
// ==========================================

use crate::domain::types::{LifecycleOperation, MoverState};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 生命周期引擎错误
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{entity} 不存在: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("搬运者 {mover_id} 无法执行 {operation} (当前状态 {from}): {reason}")]
    InvalidStateTransition {
        mover_id: String,
        from: MoverState,
        operation: LifecycleOperation,
        reason: &'static str,
    },

    #[error("搬运者 {mover_id} 超出载重上限: 当前{current_weight}, 新增{requested_weight}, 上限{weight_limit}")]
    CapacityExceeded {
        mover_id: String,
        weight_limit: f64,
        current_weight: f64,
        requested_weight: f64,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
