// ==========================================
// 列车投运排班系统 - 调车成本估算
// ==========================================
// 实现:
// - RandomCostEstimator:   占位，均匀整数 [100, 599]，可设种子
// - StablingCostEstimator: 按当前股位推算（确定性）
// - FixedCostEstimator:    常数（测试 / 推演）
// ==========================================

use crate::config::engine_config::{CostModel, EngineConfig};
use crate::domain::stabling::{SlotPosition, StablingTrack};
use crate::domain::train::TrainId;
use crate::repository::fact_store::FactSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const RANDOM_COST_MIN: u32 = 100;
pub const RANDOM_COST_MAX: u32 = 599;

/// 正线基础成本
pub const LINE_TRACK_BASE_COST: u32 = 100;
/// 停放线每条股道递增
pub const STABLING_TRACK_STEP_COST: u32 = 20;
/// 二号股位被一号股位列车挡住时的额外调车成本
pub const BLOCKED_SLOT_PENALTY: u32 = 100;
/// 位置未知
pub const UNKNOWN_POSITION_COST: u32 = 300;

// ==========================================
// CostEstimator - 成本估算接口
// ==========================================
pub trait CostEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn estimate(&self, train_id: &TrainId, facts: &FactSnapshot) -> u32;
}

// ==========================================
// RandomCostEstimator
// ==========================================
pub struct RandomCostEstimator {
    rng: Mutex<StdRng>,
}

impl RandomCostEstimator {
    /// 系统熵初始化
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// 固定种子（可复现）
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomCostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostEstimator for RandomCostEstimator {
    fn name(&self) -> &'static str {
        "random"
    }

    fn estimate(&self, _train_id: &TrainId, _facts: &FactSnapshot) -> u32 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(RANDOM_COST_MIN..=RANDOM_COST_MAX)
    }
}

// ==========================================
// StablingCostEstimator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct StablingCostEstimator;

impl CostEstimator for StablingCostEstimator {
    fn name(&self) -> &'static str {
        "stabling"
    }

    fn estimate(&self, train_id: &TrainId, facts: &FactSnapshot) -> u32 {
        let Some(position) = facts.position_of(train_id) else {
            return UNKNOWN_POSITION_COST;
        };

        let base = match position.track {
            StablingTrack::Line(_) => LINE_TRACK_BASE_COST,
            StablingTrack::Stabling(n) => LINE_TRACK_BASE_COST + STABLING_TRACK_STEP_COST * n as u32,
        };

        let blocked = position.slot == SlotPosition::Second
            && facts
                .current_occupancy()
                .get(&(position.track, SlotPosition::First))
                .map(|front| front.is_occupied() && &front.train_id != train_id)
                .unwrap_or(false);

        if blocked {
            base + BLOCKED_SLOT_PENALTY
        } else {
            base
        }
    }
}

// ==========================================
// FixedCostEstimator
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FixedCostEstimator(pub u32);

impl CostEstimator for FixedCostEstimator {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn estimate(&self, _train_id: &TrainId, _facts: &FactSnapshot) -> u32 {
        self.0
    }
}

/// 按配置构造估算器
pub fn estimator_for(config: &EngineConfig) -> Box<dyn CostEstimator> {
    match config.cost_model {
        CostModel::Random => match config.cost_seed {
            Some(seed) => Box::new(RandomCostEstimator::seeded(seed)),
            None => Box::new(RandomCostEstimator::new()),
        },
        CostModel::Stabling => Box::new(StablingCostEstimator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stabling::StablingDraft;
    use crate::domain::types::StablingStatus;
    use crate::repository::fact_store::{FactSource, FactStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn park(store: &mut FactStore, train: &str, track: &str, slot: u8, hour: u32) {
        store
            .add_stabling(StablingDraft {
                train_id: TrainId::new(train),
                track: StablingTrack::parse(track).unwrap(),
                slot: SlotPosition::from_number(slot).unwrap(),
                status: StablingStatus::Occupied,
                submitted_at: at(hour),
            })
            .unwrap();
    }

    #[test]
    fn test_random_range_and_seed() {
        let facts = FactSnapshot::default();
        let a = RandomCostEstimator::seeded(42);
        let b = RandomCostEstimator::seeded(42);
        for n in 1..=50 {
            let train = TrainId::from_number(n);
            let cost = a.estimate(&train, &facts);
            assert!((RANDOM_COST_MIN..=RANDOM_COST_MAX).contains(&cost));
            assert_eq!(cost, b.estimate(&train, &facts));
        }
    }

    #[test]
    fn test_stabling_costs() {
        let mut store = FactStore::new();
        park(&mut store, "T001", "L2", 1, 8);
        park(&mut store, "T003", "S3", 1, 8);
        park(&mut store, "T005", "S3", 2, 8);
        park(&mut store, "T007", "S10", 2, 8);
        let facts = store.snapshot();
        let est = StablingCostEstimator;

        assert_eq!(est.estimate(&TrainId::new("T001"), &facts), 100);
        assert_eq!(est.estimate(&TrainId::new("T003"), &facts), 160);
        // S3 二号位被 T003 挡住
        assert_eq!(est.estimate(&TrainId::new("T005"), &facts), 260);
        // S10 一号位空
        assert_eq!(est.estimate(&TrainId::new("T007"), &facts), 300);
        assert_eq!(est.estimate(&TrainId::new("T009"), &facts), UNKNOWN_POSITION_COST);
    }

    #[test]
    fn test_stabling_uses_latest_submission() {
        let mut store = FactStore::new();
        park(&mut store, "T002", "S1", 1, 6);
        park(&mut store, "T002", "L1", 1, 9);
        store
            .add_stabling(StablingDraft {
                train_id: TrainId::new("T002"),
                track: StablingTrack::Stabling(1),
                slot: SlotPosition::First,
                status: StablingStatus::Empty,
                submitted_at: at(9),
            })
            .unwrap();
        let facts = store.snapshot();
        // 成本按 position_of 给出的当前股位计算
        let position = facts.position_of(&TrainId::new("T002")).unwrap();
        assert_eq!(position.track, StablingTrack::Line(1));
        assert_eq!(StablingCostEstimator.estimate(&TrainId::new("T002"), &facts), 100);
    }

    #[test]
    fn test_estimator_for_config() {
        let config = EngineConfig::default().with_cost_model(CostModel::Stabling, None);
        assert_eq!(estimator_for(&config).name(), "stabling");
        assert_eq!(estimator_for(&EngineConfig::default()).name(), "random");
        assert_eq!(FixedCostEstimator(250).estimate(&TrainId::new("T001"), &FactSnapshot::default()), 250);
    }
}
