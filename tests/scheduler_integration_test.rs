// ==========================================
// 排班引擎集成测试
// ==========================================
// 职责: 验证 事实库 → 冲突检测 → 分类 → 成本 → 排序 的完整数据流
// ==========================================


use chrono::Duration;
use test_helpers::{certificate, date, job_card, now, scheduler, today};
use train_induction::app::demo_fact_store;
use train_induction::config::{CostModel, EngineConfig};
use train_induction::domain::types::{ConflictType, InductionAction, RiskLevel};
use train_induction::engine::{
    InductionScheduler, REASON_ALL_CLEAR, REASON_MISSING_CERTIFICATE, REASON_OPEN_JOB_CARD,
};
use train_induction::{FactSnapshot, FactSource, FactStore, TrainId};

fn three_train_scenario() -> FactStore {
    let mut store = FactStore::new();
    store.add_job_card(job_card("T001", "JOB2001")).unwrap();
    store
        .add_certificate(certificate("T002", date(1, 1), date(12, 31)))
        .unwrap();
    store
}

#[test]
fn test_three_train_scenario() {
    let run = scheduler(3, EngineConfig::default()).run(&three_train_scenario().snapshot(), now());

    let summary: Vec<(u32, &str, InductionAction, RiskLevel, &str)> = run
        .plan
        .entries
        .iter()
        .map(|e| {
            (
                e.rank,
                e.train_id.as_str(),
                e.recommended_action,
                e.predicted_risk,
                e.reasons[0].as_str(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (1, "T002", InductionAction::Service, RiskLevel::Low, REASON_ALL_CLEAR),
            (2, "T003", InductionAction::Standby, RiskLevel::Medium, REASON_MISSING_CERTIFICATE),
            (3, "T001", InductionAction::Ibl, RiskLevel::High, REASON_OPEN_JOB_CARD),
        ]
    );

    // T001 作业单冲突 + T001/T003 缺证冲突
    let open = run
        .conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::OpenJobCard)
        .count();
    let missing: Vec<&str> = run
        .conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::MissingCertificate)
        .map(|c| c.train_id.as_str())
        .collect();
    assert_eq!(open, 1);
    assert_eq!(missing, vec!["T001", "T003"]);
}

#[test]
fn test_certificate_expired_yesterday_means_standby() {
    let mut store = FactStore::new();
    store
        .add_certificate(certificate("T001", date(1, 1), today() - Duration::days(1)))
        .unwrap();
    store
        .add_certificate(certificate("T002", date(1, 1), today()))
        .unwrap();

    let run = scheduler(2, EngineConfig::default()).run(&store.snapshot(), now());
    let t001 = run.plan.entry_for(&TrainId::new("T001")).unwrap();
    let t002 = run.plan.entry_for(&TrainId::new("T002")).unwrap();

    assert_eq!(t001.recommended_action, InductionAction::Standby);
    // 有效期含当天
    assert_eq!(t002.recommended_action, InductionAction::Service);
}

#[test]
fn test_closing_job_card_lifts_block() {
    let mut store = three_train_scenario();
    store
        .add_certificate(certificate("T001", date(1, 1), date(12, 31)))
        .unwrap();
    let sched = scheduler(3, EngineConfig::default());

    let before = sched.run(&store.snapshot(), now());
    assert_eq!(
        before.plan.entry_for(&TrainId::new("T001")).unwrap().recommended_action,
        InductionAction::Ibl
    );

    let id = store.facts().job_cards[0].id.clone();
    store.close_job_card(&id).unwrap();

    let after = sched.run(&store.snapshot(), now());
    assert_eq!(
        after.plan.entry_for(&TrainId::new("T001")).unwrap().recommended_action,
        InductionAction::Service
    );
    assert!(after
        .conflicts
        .iter()
        .all(|c| c.conflict_type != ConflictType::OpenJobCard));
}

#[test]
fn test_same_snapshot_same_result() {
    let facts = three_train_scenario().snapshot();
    let sched = scheduler(5, EngineConfig::default());

    let a = sched.run(&facts, now());
    let b = sched.run(&facts, now());

    assert_ne!(a.plan.plan_id, b.plan.plan_id);
    assert_eq!(a.plan.entries, b.plan.entries);
    assert_eq!(a.conflicts, b.conflicts);
}

#[test]
fn test_seeded_random_costs_reproducible() {
    let facts = three_train_scenario().snapshot();
    let config = EngineConfig {
        fleet_size: 5,
        ..EngineConfig::default()
    }
    .with_cost_model(CostModel::Random, Some(42));

    let costs = |run: train_induction::SchedulerRun| -> Vec<u32> {
        run.plan.entries.iter().map(|e| e.shunt_cost).collect()
    };
    let a = costs(InductionScheduler::new(config.clone()).run(&facts, now()));
    let b = costs(InductionScheduler::new(config).run(&facts, now()));

    assert_eq!(a, b);
    assert!(a.iter().all(|c| (100..=599).contains(c)));
}

#[test]
fn test_weighted_mode_keeps_gates() {
    let facts = three_train_scenario().snapshot();
    let run = scheduler(3, EngineConfig::default().weighted()).run(&facts, now());

    let t001 = run.plan.entry_for(&TrainId::new("T001")).unwrap();
    let t003 = run.plan.entry_for(&TrainId::new("T003")).unwrap();
    assert_eq!((t001.recommended_action, t001.predicted_risk), (InductionAction::Ibl, RiskLevel::High));
    assert_eq!((t003.recommended_action, t003.predicted_risk), (InductionAction::Standby, RiskLevel::Medium));
    assert!(run.plan.entries.iter().all(|e| e.score.is_some()));
}

#[test]
fn test_empty_snapshot_full_plan() {
    let run = scheduler(25, EngineConfig::default()).run(&FactSnapshot::default(), now());
    assert_eq!(run.plan.len(), 25);
    assert!(run
        .plan
        .entries
        .iter()
        .all(|e| e.recommended_action == InductionAction::Standby));
}

#[test]
fn test_demo_fleet_plan() {
    let store = demo_fact_store(now()).unwrap();
    let stabling = EngineConfig::default().with_cost_model(CostModel::Stabling, None);
    let run = InductionScheduler::new(stabling).run(&store.snapshot(), now());

    assert_eq!(run.plan.len(), 25);
    let ibl: Vec<&str> = run
        .plan
        .entries
        .iter()
        .filter(|e| e.recommended_action == InductionAction::Ibl)
        .map(|e| e.train_id.as_str())
        .collect();
    assert_eq!(ibl, vec!["T001", "T003"]);
    assert_eq!(run.plan.entries[23].rank, 24);

    // 股位成本: T001 S1 首位，T005 正线，未登记列车
    let cost = |id: &str| run.plan.entry_for(&TrainId::new(id)).unwrap().shunt_cost;
    assert_eq!(cost("T001"), 120);
    assert_eq!(cost("T005"), 100);
    assert_eq!(cost("T002"), 300);
}
