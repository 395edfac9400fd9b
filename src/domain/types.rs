// ==========================================
// 魔法搬运调度系统 - 领域类型定义
// ==========================================
// 状态机: resting → loading → on-mission → resting
// 红线: 不允许跳过任何状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 搬运者状态 (Mover State)
// ==========================================
// 同时作为任务日志的 activity 取值
// 序列化格式: kebab-case (resting / loading / on-mission)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoverState {
    Resting,   // 休息（初始状态，可循环回到）
    Loading,   // 装载中
    OnMission, // 执行任务中
}

impl MoverState {
    /// 全部状态（按生命周期顺序）
    pub const ALL: [MoverState; 3] = [
        MoverState::Resting,
        MoverState::Loading,
        MoverState::OnMission,
    ];

    /// 全部状态的字符串形式（与 ALL 顺序一致）
    pub const NAMES: [&'static str; 3] = ["resting", "loading", "on-mission"];

    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            MoverState::Resting => "resting",
            MoverState::Loading => "loading",
            MoverState::OnMission => "on-mission",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "resting" => Some(MoverState::Resting),
            "loading" => Some(MoverState::Loading),
            "on-mission" => Some(MoverState::OnMission),
            _ => None,
        }
    }

    /// 生命周期中的下一个状态
    pub fn next(&self) -> MoverState {
        match self {
            MoverState::Resting => MoverState::Loading,
            MoverState::Loading => MoverState::OnMission,
            MoverState::OnMission => MoverState::Resting,
        }
    }

    /// 是否允许从当前状态直接转换到 target
    pub fn can_transition_to(&self, target: MoverState) -> bool {
        self.next() == target
    }}

impl fmt::Display for MoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 生命周期操作 (Lifecycle Operation)
// ==========================================
// 用途: 状态转换被拒绝时说明是哪个操作、为什么
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleOperation {
    LoadCargo,
    StartMission,
    EndMission,
}

impl LifecycleOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleOperation::LoadCargo => "load-cargo",
            LifecycleOperation::StartMission => "start-mission",
            LifecycleOperation::EndMission => "end-mission",
        }
    }

    /// 操作被拒绝时返回给调用方的原因
    pub fn rejection_reason(&self) -> &'static str {
        match self {
            LifecycleOperation::LoadCargo => "busy on a mission",
            LifecycleOperation::StartMission => "not in loading state",
            LifecycleOperation::EndMission => "not on a mission",
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
