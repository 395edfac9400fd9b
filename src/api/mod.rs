// ==========================================
// 魔法搬运调度系统 - API 层
// ==========================================
// 职责: 对外边界操作，统一错误归类
// ==========================================

pub mod common;
pub mod error;
pub mod item_api;
pub mod mission_log_api;
pub mod mover_api;
pub mod validator;

// 重导出核心类型
pub use common::ListRequest;
pub use error::{ApiError, ApiResult, ErrorOutcome, ValidationViolation};
pub use item_api::ItemApi;
pub use mission_log_api::MissionLogApi;
pub use mover_api::MoverApi;
pub use validator::{FieldSpec, FieldType, PayloadValidator, ValidationMode};
