// ==========================================
// 魔法搬运调度系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将仓储/引擎错误转换为调用方可处理的结果
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::domain::types::{LifecycleOperation, MoverState};
use crate::engine::error::LifecycleError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 资源错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 生命周期规则错误
    // ==========================================
    #[error("搬运者 {mover_id} 无法执行 {operation} (当前状态 {from}): {reason}")]
    InvalidStateTransition {
        mover_id: String,
        from: MoverState,
        operation: LifecycleOperation,
        reason: String,
    },

    #[error(
        "超出载重上限: mover_id={mover_id}, 当前{current_weight}, 新增{requested_weight}, 上限{weight_limit}"
    )]
    CapacityExceeded {
        mover_id: String,
        weight_limit: f64,
        current_weight: f64,
        requested_weight: f64,
    },

    #[error("数据约束违反: {0}")]
    ConstraintViolation(String),

    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效的查询参数: {0}")]
    InvalidQuery(String),

    /// 负载校验失败（只携带第一个违规）
    #[error("{0}")]
    ValidationFailed(ValidationViolation),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发修改冲突: {0}")]
    ConcurrentModification(String),

    // ==========================================
    // 数据访问 / 通用错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 错误归类（供上层传输协议映射）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOutcome {
    NotFound,
    BadRequest,
    Conflict,
    Internal,
}

impl ApiError {
    pub fn outcome(&self) -> ErrorOutcome {
        match self {
            ApiError::NotFound(_) => ErrorOutcome::NotFound,
            ApiError::InvalidStateTransition { .. }
            | ApiError::CapacityExceeded { .. }
            | ApiError::ConstraintViolation(_)
            | ApiError::InvalidQuery(_)
            | ApiError::ValidationFailed(_) => ErrorOutcome::BadRequest,
            ApiError::ConcurrentModification(_) => ErrorOutcome::Conflict,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                ErrorOutcome::Internal
            }
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::ConcurrentModification(format!(
                "{}(id={})已被其他请求修改（期望revision={}，实际revision={}）",
                entity, id, expected, actual
            )),

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ConstraintViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ConstraintViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => ApiError::ConstraintViolation(msg),

            // 查询参数错误
            RepositoryError::InvalidQuery(msg) => ApiError::InvalidQuery(msg),

            // 数据质量错误（库内数据损坏）
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 LifecycleError 转换
// ==========================================
impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            LifecycleError::InvalidStateTransition {
                mover_id,
                from,
                operation,
                reason,
            } => ApiError::InvalidStateTransition {
                mover_id,
                from,
                operation,
                reason: reason.to_string(),
            },
            LifecycleError::CapacityExceeded {
                mover_id,
                weight_limit,
                current_weight,
                requested_weight,
            } => ApiError::CapacityExceeded {
                mover_id,
                weight_limit,
                current_weight,
                requested_weight,
            },
            LifecycleError::Repository(e) => e.into(),
        }
    }
}

impl From<ValidationViolation> for ApiError {
    fn from(violation: ValidationViolation) -> Self {
        ApiError::ValidationFailed(violation)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 字段路径（如 `weight`、`cargo[0].itemId`）
    pub field: String,
    /// 对外消息（如 `"weight" must be a number`）
    pub message: String,
}

impl ValidationViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
