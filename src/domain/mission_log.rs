// ==========================================
// 魔法搬运调度系统 - 任务日志领域模型
// ==========================================
// 红线: 每次成功的状态转换必须记录一条日志
// 日志一次写入，只允许显式的纠错更新
// ==========================================

use crate::domain::types::MoverState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MissionLogEntry - 任务日志条目
// ==========================================
// 对齐: mission_log 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionLogEntry {
    pub id: String,               // 日志ID (UUID)
    pub mover_id: String,         // 关联搬运者 (不做外键，搬运者删除后日志保留)
    pub activity: MoverState,     // 转换后进入的状态
    pub timestamp: NaiveDateTime, // 记录时间 (UTC)
}

/// 新建日志的数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMissionLog {
    pub mover_id: String,
    pub activity: MoverState,
}

impl NewMissionLog {
    pub fn new(mover_id: impl Into<String>, activity: MoverState) -> Self {
        Self {
            mover_id: mover_id.into(),
            activity,
        }
    }
}

/// 日志纠错更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionLogPatch {
    pub mover_id: Option<String>,
    pub activity: Option<MoverState>,
}
