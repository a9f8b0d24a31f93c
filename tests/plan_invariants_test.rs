// ==========================================
// 投运计划不变量 - 属性测试
// ==========================================
// 随机车队事实（作业单开/闭、证书有效期前后偏移）下检查:
// - 每列车恰好一条，名次 1..N 连续
// - 动作优先级不降序
// - 作业单/证书硬阻断在两种模式下都成立
// - 冲突计数与事实一致
// - 同一快照结果可复现
// ==========================================


use chrono::Duration;
use proptest::prelude::*;
use std::collections::BTreeSet;
use test_helpers::{certificate, date, job_card, now, scheduler, today};
use train_induction::config::EngineConfig;
use train_induction::domain::types::{ConflictType, InductionAction, RiskLevel};
use train_induction::{FactSnapshot, FactSource, FactStore, TrainId};

#[derive(Debug, Clone)]
struct TrainFacts {
    /// 每张作业单是否仍为 Open
    cards: Vec<bool>,
    /// 证书到期日相对今天的偏移（天）
    cert_offset: Option<i64>,
}

fn train_facts() -> impl Strategy<Value = TrainFacts> {
    (
        prop::collection::vec(any::<bool>(), 0..3),
        prop::option::of(-3i64..3),
    )
        .prop_map(|(cards, cert_offset)| TrainFacts { cards, cert_offset })
}

fn build(fleet: &[TrainFacts]) -> FactSnapshot {
    let mut store = FactStore::new();
    for (idx, facts) in fleet.iter().enumerate() {
        let train = TrainId::from_number(idx as u32 + 1);
        for (n, open) in facts.cards.iter().enumerate() {
            let id = store
                .add_job_card(job_card(train.as_str(), &format!("JOB{}", 3000 + idx * 10 + n)))
                .unwrap();
            if !open {
                store.close_job_card(&id).unwrap();
            }
        }
        if let Some(offset) = facts.cert_offset {
            store
                .add_certificate(certificate(
                    train.as_str(),
                    date(1, 1),
                    today() + Duration::days(offset),
                ))
                .unwrap();
        }
    }
    store.snapshot()
}

fn expected_gate(facts: &TrainFacts) -> Option<(InductionAction, RiskLevel)> {
    if facts.cards.iter().any(|open| *open) {
        Some((InductionAction::Ibl, RiskLevel::High))
    } else if facts.cert_offset.map(|o| o < 0).unwrap_or(true) {
        Some((InductionAction::Standby, RiskLevel::Medium))
    } else {
        None
    }
}

fn check_plan(fleet: &[TrainFacts], config: EngineConfig) -> Result<(), TestCaseError> {
    let snapshot = build(fleet);
    let sched = scheduler(fleet.len() as u32, config);
    let run = sched.run(&snapshot, now());
    let plan = &run.plan;

    // 每列车恰好一条
    prop_assert_eq!(plan.len(), fleet.len());
    let ids: BTreeSet<&TrainId> = plan.entries.iter().map(|e| &e.train_id).collect();
    prop_assert_eq!(ids.len(), fleet.len());

    // 名次连续
    let ranks: Vec<u32> = plan.entries.iter().map(|e| e.rank).collect();
    prop_assert_eq!(ranks, (1..=fleet.len() as u32).collect::<Vec<_>>());

    // 动作优先级不降序
    for pair in plan.entries.windows(2) {
        prop_assert!(pair[0].recommended_action.priority() <= pair[1].recommended_action.priority());
    }

    // 硬阻断
    for (idx, facts) in fleet.iter().enumerate() {
        let entry = plan
            .entry_for(&TrainId::from_number(idx as u32 + 1))
            .ok_or_else(|| TestCaseError::fail("missing entry"))?;
        prop_assert!(!entry.reasons.is_empty());
        match expected_gate(facts) {
            Some((action, risk)) => {
                prop_assert_eq!(entry.recommended_action, action);
                prop_assert_eq!(entry.predicted_risk, risk);
            }
            None => prop_assert_ne!(entry.recommended_action, InductionAction::Ibl),
        }
    }

    // 冲突计数
    let open_cards: usize = fleet
        .iter()
        .map(|f| f.cards.iter().filter(|o| **o).count())
        .sum();
    let uncertified = fleet
        .iter()
        .filter(|f| f.cert_offset.map(|o| o < 0).unwrap_or(true))
        .count();
    let count = |kind: ConflictType| run.conflicts.iter().filter(|c| c.conflict_type == kind).count();
    prop_assert_eq!(count(ConflictType::OpenJobCard), open_cards);
    prop_assert_eq!(count(ConflictType::MissingCertificate), uncertified);

    // 可复现
    let again = sched.run(&snapshot, now());
    prop_assert_eq!(&again.plan.entries, &plan.entries);

    Ok(())
}

proptest! {
    #[test]
    fn rule_priority_plan_invariants(fleet in prop::collection::vec(train_facts(), 1..12)) {
        check_plan(&fleet, EngineConfig::default())?;

        // 规则模式: 无阻断即 Service / Low
        let run = scheduler(fleet.len() as u32, EngineConfig::default()).run(&build(&fleet), now());
        for (idx, facts) in fleet.iter().enumerate() {
            if expected_gate(facts).is_none() {
                let entry = run.plan.entry_for(&TrainId::from_number(idx as u32 + 1)).unwrap();
                prop_assert_eq!(entry.recommended_action, InductionAction::Service);
                prop_assert_eq!(entry.predicted_risk, RiskLevel::Low);
            }
        }
    }

    #[test]
    fn weighted_plan_invariants(fleet in prop::collection::vec(train_facts(), 1..12)) {
        check_plan(&fleet, EngineConfig::default().weighted())?;
    }
}
