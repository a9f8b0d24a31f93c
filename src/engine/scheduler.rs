// ==========================================
// 列车投运排班系统 - 排班编排器
// ==========================================
// 计算主流程:
// 快照 → 冲突检测 → 冲突清单
// 快照 → 分类 → 成本估算 → 排序 → 投运计划
// 红线: 引擎无错误路径；空快照同样输出完整计划
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::conflict::Conflict;
use crate::domain::plan::{Classification, InductionPlan};
use crate::domain::train::Fleet;
use crate::domain::types::InductionAction;
use crate::engine::classifier::InductionClassifier;
use crate::engine::conflict::ConflictDetector;
use crate::engine::cost::{estimator_for, CostEstimator};
use crate::engine::ranker::InductionRanker;
use crate::repository::fact_store::FactSnapshot;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// SchedulerRun - 单次排班结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerRun {
    pub plan: InductionPlan,
    pub conflicts: Vec<Conflict>,
}

// ==========================================
// InductionScheduler - 排班编排器
// ==========================================
pub struct InductionScheduler {
    config: EngineConfig,
    classifier: InductionClassifier,
    detector: ConflictDetector,
    ranker: InductionRanker,
    estimator: Box<dyn CostEstimator>,
}

impl InductionScheduler {
    /// 按配置创建（成本模型取自配置）
    pub fn new(config: EngineConfig) -> Self {
        let estimator = estimator_for(&config);
        Self::with_estimator(config, estimator)
    }

    /// 注入成本估算器（测试 / 推演）
    pub fn with_estimator(config: EngineConfig, estimator: Box<dyn CostEstimator>) -> Self {
        Self {
            classifier: InductionClassifier::new(&config),
            detector: ConflictDetector::new(&config),
            ranker: InductionRanker::new(),
            estimator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 参与排班的车队: 配置规模 + 事实中出现的车号
    pub fn resolve_fleet(&self, facts: &FactSnapshot) -> Fleet {
        Fleet::with_size(self.config.fleet_size).extended_with(facts.referenced_train_ids().iter())
    }

    /// 执行一次完整排班
    pub fn run(&self, facts: &FactSnapshot, now: NaiveDateTime) -> SchedulerRun {
        let fleet = self.resolve_fleet(facts);
        self.run_for_fleet(&fleet, facts, now)
    }

    /// 指定车队执行排班
    pub fn run_for_fleet(&self, fleet: &Fleet, facts: &FactSnapshot, now: NaiveDateTime) -> SchedulerRun {
        info!(
            train_count = fleet.len(),
            mode = %self.config.mode,
            cost_model = self.estimator.name(),
            "开始执行投运排班"
        );

        // ==========================================
        // 步骤1: 冲突检测
        // ==========================================
        let conflicts = self.detector.detect(fleet, facts, now);

        // ==========================================
        // 步骤2: 分类 + 成本估算
        // ==========================================
        let classifications: Vec<Classification> = fleet
            .iter()
            .map(|train_id| {
                let mut c = self.classifier.classify(train_id, facts, now);
                c.shunt_cost = self.estimator.estimate(train_id, facts);
                debug!(
                    train_id = %c.train_id,
                    action = %c.action,
                    risk = %c.risk,
                    shunt_cost = c.shunt_cost,
                    "列车分类完成"
                );
                c
            })
            .collect();

        // ==========================================
        // 步骤3: 排序
        // ==========================================
        let entries = self.ranker.rank(classifications);

        let plan = InductionPlan {
            plan_id: format!("plan_{}", Uuid::new_v4()),
            generated_at: now,
            mode: self.config.mode,
            entries,
        };

        info!(
            plan_id = %plan.plan_id,
            service = plan.count_action(InductionAction::Service),
            standby = plan.count_action(InductionAction::Standby),
            ibl = plan.count_action(InductionAction::Ibl),
            conflicts = conflicts.len(),
            "投运排班完成"
        );

        SchedulerRun { plan, conflicts }
    }
}

impl Default for InductionScheduler {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::train::TrainId;
    use crate::domain::types::RiskLevel;
    use crate::engine::classifier::REASON_ALL_CLEAR;
    use crate::engine::cost::FixedCostEstimator;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 20)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_snapshot_yields_full_plan() {
        let scheduler = InductionScheduler::with_estimator(
            EngineConfig::default(),
            Box::new(FixedCostEstimator(150)),
        );
        let run = scheduler.run(&FactSnapshot::default(), now());

        assert_eq!(run.plan.len(), 25);
        let ranks: Vec<u32> = run.plan.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=25).collect::<Vec<u32>>());
        // 无证书 → 全部 Standby
        assert!(run
            .plan
            .entries
            .iter()
            .all(|e| e.recommended_action == InductionAction::Standby
                && e.predicted_risk == RiskLevel::Medium
                && e.shunt_cost == 150));
        assert_eq!(run.plan.entries[0].train_id, TrainId::new("T001"));
        assert_eq!(run.conflicts.len(), 25);
    }

    #[test]
    fn test_fleet_extended_with_discovered_ids() {
        let mut facts = FactSnapshot::default();
        facts.mileage.push(crate::domain::mileage::MileageData {
            id: "md_1".to_string(),
            train_id: TrainId::new("T1000"),
            daily_km: 10.0,
            km_since_maintenance: 10.0,
            reading_date: now().date(),
        });
        let config = EngineConfig {
            fleet_size: 3,
            ..EngineConfig::default()
        };
        let scheduler = InductionScheduler::with_estimator(config, Box::new(FixedCostEstimator(100)));
        let fleet = scheduler.resolve_fleet(&facts);
        let ids: Vec<&str> = fleet.iter().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["T001", "T002", "T003", "T1000"]);

        let run = scheduler.run(&facts, now());
        assert_eq!(run.plan.len(), 4);
        assert_ne!(run.plan.entries[0].reasons[0], REASON_ALL_CLEAR);
    }
}
