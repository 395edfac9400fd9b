// ==========================================
// 魔法搬运调度系统 - 搬运者领域模型
// ==========================================
// 状态机: resting → loading → on-mission → resting
// 红线1: sum(cargo.weight) ≤ weight_limit 始终成立
// 红线2: 只有 loading / on-mission 状态允许携带货物
// 红线3: 每次转换产出新的快照，不原地修改已读取的记录
// ==========================================

use crate::domain::item::Item;
use crate::domain::types::{LifecycleOperation, MoverState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// CargoEntry - 货物条目
// ==========================================
// 重量在装载时复制，之后不再读取物品表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoEntry {
    pub item_id: String,
    pub weight: f64,
}

// ==========================================
// Mover - 搬运者
// ==========================================
// 对齐: magic_mover 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    // ===== 主键 =====
    pub id: String,

    // ===== 基础信息 =====
    pub name: String,
    pub weight_limit: f64, // 载重上限 (> 0)

    // ===== 生命周期 =====
    pub state: MoverState,
    pub cargo: Vec<CargoEntry>, // 允许同一物品重复装载
    pub mission_count: i64,     // 任务次数 (开始任务时 +1)

    // ===== 并发控制 =====
    pub revision: i64, // 乐观锁版本号，每次持久化 +1
}

/// 新建搬运者的数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMover {
    pub name: String,
    pub weight_limit: f64,
}

/// 搬运者部分更新（只允许基础信息，状态与货物只能由生命周期引擎修改）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverPatch {
    pub name: Option<String>,
    pub weight_limit: Option<f64>,
}

// ==========================================
// TransitionError - 转换被拒绝的原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("状态 {from} 不允许执行 {operation}")]
    InvalidState {
        from: MoverState,
        operation: LifecycleOperation,
    },

    #[error("超出载重上限: 当前{current_weight}, 新增{requested_weight}, 上限{weight_limit}")]
    CapacityExceeded {
        weight_limit: f64,
        current_weight: f64,
        requested_weight: f64,
    },
}

// ==========================================
// Trait: CargoCapacity
// ==========================================
// 用途: 载重相关的只读计算
pub trait CargoCapacity {
    /// 当前货物总重
    fn cargo_weight(&self) -> f64;

    /// 剩余可装载重量，最小为 0
    fn remaining_capacity(&self) -> f64;

    /// 追加 weight 后是否仍不超过上限
    fn can_accept(&self, weight: f64) -> bool;
}

impl CargoCapacity for Mover {
    fn cargo_weight(&self) -> f64 {
        self.cargo.iter().map(|entry| entry.weight).sum()
    }

    fn remaining_capacity(&self) -> f64 {
        (self.weight_limit - self.cargo_weight()).max(0.0)
    }

    fn can_accept(&self, weight: f64) -> bool {
        self.cargo_weight() + weight <= self.weight_limit
    }
}

// ==========================================
// 生命周期转换（纯函数，返回新快照）
// ==========================================
// 快照的 revision 保持为读取时的值，作为持久化时的期望版本
impl Mover {
    /// 装载前置步骤: resting 自动进入 loading
    ///
    /// # 返回
    /// - resting: 新快照，状态为 loading
    /// - loading: 原样复制
    /// - on-mission: Err(InvalidState)
    pub fn begin_loading(&self) -> Result<Mover, TransitionError> {
        if self.state == MoverState::Loading {
            return Ok(self.clone());
        }
        self.advance(MoverState::Loading, LifecycleOperation::LoadCargo)
    }

    /// 装载一件物品
    ///
    /// 要求当前状态为 loading（调用方应先执行 begin_loading）
    pub fn load(&self, item: &Item) -> Result<Mover, TransitionError> {
        if self.state != MoverState::Loading {
            return Err(TransitionError::InvalidState {
                from: self.state,
                operation: LifecycleOperation::LoadCargo,
            });
        }

        if !self.can_accept(item.weight) {
            return Err(TransitionError::CapacityExceeded {
                weight_limit: self.weight_limit,
                current_weight: self.cargo_weight(),
                requested_weight: item.weight,
            });
        }

        let mut next = self.clone();
        next.cargo.push(CargoEntry {
            item_id: item.id.clone(),
            weight: item.weight,
        });
        Ok(next)
    }

    /// 开始任务: loading → on-mission，任务次数 +1
    pub fn start_mission(&self) -> Result<Mover, TransitionError> {
        let mut next = self.advance(MoverState::OnMission, LifecycleOperation::StartMission)?;
        next.mission_count += 1;
        Ok(next)
    }

    /// 结束任务: on-mission → resting，清空货物，任务次数不变
    pub fn end_mission(&self) -> Result<Mover, TransitionError> {
        let mut next = self.advance(MoverState::Resting, LifecycleOperation::EndMission)?;
        next.cargo.clear();
        Ok(next)
    }

    /// 应用基础信息更新
    ///
    /// 新的载重上限不得低于当前货物总重
    pub fn apply_patch(&self, patch: &MoverPatch) -> Result<Mover, TransitionError> {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            next.name = name.clone();
        }

        if let Some(weight_limit) = patch.weight_limit {
            let current_weight = self.cargo_weight();
            if current_weight > weight_limit {
                return Err(TransitionError::CapacityExceeded {
                    weight_limit,
                    current_weight,
                    requested_weight: 0.0,
                });
            }
            next.weight_limit = weight_limit;
        }

        Ok(next)
    }

    /// 按状态机推进到 target，返回新快照
    fn advance(
        &self,
        target: MoverState,
        operation: LifecycleOperation,
    ) -> Result<Mover, TransitionError> {
        if !self.state.can_transition_to(target) {
            return Err(TransitionError::InvalidState {
                from: self.state,
                operation,
            });
        }

        Ok(Mover {
            state: target,
            ..self.clone()
        })
    }
}
