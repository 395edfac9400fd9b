// ==========================================
// 魔法搬运调度系统 - 搬运者生命周期引擎
// ==========================================
// 状态机: resting → loading → on-mission → resting
// 红线1: 检查失败时不写入任何数据
// 红线2: 搬运者写入成功后才写日志
// 红线3: 写入以读取时的 revision 为条件，重复/并发调用被拒绝
// ==========================================
// 职责: 读取 → 检查 → 条件写入 → 记日志
// 输入: 搬运者ID (+ 物品ID)
// 输出: 转换后的搬运者快照
// ==========================================

use crate::domain::mission_log::NewMissionLog;
use crate::domain::mover::{Mover, TransitionError};
use crate::engine::error::{LifecycleError, LifecycleResult};
use crate::engine::repositories::LifecycleRepositories;
use tracing::{error, info, instrument, warn};

// ==========================================
// MoverLifecycleEngine - 生命周期引擎
// ==========================================
pub struct MoverLifecycleEngine {
    repos: LifecycleRepositories,
}

impl MoverLifecycleEngine {
    pub fn new(repos: LifecycleRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 核心操作
    // ==========================================

    /// 装载货物
    ///
    /// # 规则
    /// - 检查顺序: 搬运者存在 → 状态 → 物品存在 → 载重
    /// - resting 先经 begin_loading 进入 loading；on-mission 拒绝
    /// - 当前货物 + 物品重量 > 上限 → CapacityExceeded
    /// - 状态推进与追加货物作为一次条件写入，之后记录 loading 日志
    #[instrument(skip(self))]
    pub fn load_cargo(&self, mover_id: &str, item_id: &str) -> LifecycleResult<Mover> {
        let mover = self.fetch_mover(mover_id)?;

        // 任务中的搬运者先于物品检查被拒绝
        let staged = mover.begin_loading().map_err(|e| Self::rejected(mover_id, e))?;

        let item = self
            .repos
            .item_store
            .find_by_id(item_id)?
            .ok_or_else(|| LifecycleError::NotFound {
                entity: "Item",
                id: item_id.to_string(),
            })?;

        let next = staged.load(&item).map_err(|e| Self::rejected(mover_id, e))?;

        let saved = self.persist(&next)?;
        info!(
            mover_id = %saved.id,
            item_id = %item.id,
            weight = item.weight,
            cargo_count = saved.cargo.len(),
            "货物已装载"
        );
        Ok(saved)
    }

    /// 开始任务: 仅允许从 loading 开始，任务次数 +1
    #[instrument(skip(self))]
    pub fn start_mission(&self, mover_id: &str) -> LifecycleResult<Mover> {
        let mover = self.fetch_mover(mover_id)?;
        let next = mover
            .start_mission()
            .map_err(|e| Self::rejected(mover_id, e))?;

        let saved = self.persist(&next)?;
        info!(
            mover_id = %saved.id,
            mission_count = saved.mission_count,
            "任务已开始"
        );
        Ok(saved)
    }

    /// 结束任务: 仅允许从 on-mission 结束，清空货物
    #[instrument(skip(self))]
    pub fn end_mission(&self, mover_id: &str) -> LifecycleResult<Mover> {
        let mover = self.fetch_mover(mover_id)?;
        let unloaded = mover.cargo.len();
        let next = mover
            .end_mission()
            .map_err(|e| Self::rejected(mover_id, e))?;

        let saved = self.persist(&next)?;
        info!(mover_id = %saved.id, unloaded, "任务已结束");
        Ok(saved)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn fetch_mover(&self, mover_id: &str) -> LifecycleResult<Mover> {
        self.repos
            .mover_store
            .find_by_id(mover_id)?
            .ok_or_else(|| LifecycleError::NotFound {
                entity: "Mover",
                id: mover_id.to_string(),
            })
    }

    /// 条件写入快照，成功后追加日志
    ///
    /// 日志写入失败时错误向上传递（搬运者已写入，不回滚）
    fn persist(&self, next: &Mover) -> LifecycleResult<Mover> {
        let saved = self.repos.mover_store.save_transition(next)?;

        let log = NewMissionLog::new(saved.id.clone(), saved.state);
        if let Err(e) = self.repos.mission_log_store.create(&log) {
            error!(
                mover_id = %saved.id,
                activity = %saved.state,
                error = %e,
                "搬运者已更新，但任务日志写入失败"
            );
            return Err(e.into());
        }

        Ok(saved)
    }

    fn rejected(mover_id: &str, err: TransitionError) -> LifecycleError {
        let mapped = match err {
            TransitionError::InvalidState { from, operation } => {
                LifecycleError::InvalidStateTransition {
                    mover_id: mover_id.to_string(),
                    from,
                    operation,
                    reason: operation.rejection_reason(),
                }
            }
            TransitionError::CapacityExceeded {
                weight_limit,
                current_weight,
                requested_weight,
            } => LifecycleError::CapacityExceeded {
                mover_id: mover_id.to_string(),
                weight_limit,
                current_weight,
                requested_weight,
            },
        };

        warn!(mover_id, error = %mapped, "生命周期操作被拒绝");
        mapped
    }
}
