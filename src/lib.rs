// ==========================================
// 魔法搬运调度系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 搬运者生命周期状态机 + 载重约束 + 任务日志
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 生命周期规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 边界操作
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{LifecycleOperation, MoverState};

// 领域实体
pub use domain::{CargoEntry, Item, MissionLogEntry, Mover};

// 引擎
pub use engine::{LifecycleError, MoverLifecycleEngine, MoverRanking};

// API
pub use api::{ApiError, ErrorOutcome, ItemApi, ListRequest, MissionLogApi, MoverApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "魔法搬运调度系统";
