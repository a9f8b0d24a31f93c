// ==========================================
// 列车投运排班系统 - 排序引擎
// ==========================================
// 排序键:
// 1) 动作优先级 Service(1) < Standby(2) < IBL(3)
// 2) 加权模式: 综合分升序（风险低者靠前）
// 3) 其余保持输入顺序（车队顺序，稳定排序）
// 红线: rank 从 1 开始连续、唯一
// ==========================================

use crate::domain::plan::{Classification, InductionPlanEntry};
use std::cmp::Ordering;

pub struct InductionRanker {
    // 无状态引擎,不需要注入依赖
}

impl InductionRanker {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序并分配名次
    pub fn rank(&self, mut classifications: Vec<Classification>) -> Vec<InductionPlanEntry> {
        classifications.sort_by(|a, b| self.compare(a, b));

        classifications
            .into_iter()
            .enumerate()
            .map(|(idx, c)| InductionPlanEntry {
                rank: idx as u32 + 1,
                train_id: c.train_id,
                recommended_action: c.action,
                reasons: c.reasons,
                shunt_cost: c.shunt_cost,
                predicted_risk: c.risk,
                score: c.score,
            })
            .collect()
    }

    fn compare(&self, a: &Classification, b: &Classification) -> Ordering {
        a.action
            .priority()
            .cmp(&b.action.priority())
            .then_with(|| match (a.score, b.score) {
                (Some(sa), Some(sb)) => sa.total_cmp(&sb),
                _ => Ordering::Equal,
            })
    }
}

impl Default for InductionRanker {
    fn default() -> Self {
        Self::new()
    }
}
