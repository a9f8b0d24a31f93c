// ==========================================
// 列车投运排班系统 - 投运排班 API
// ==========================================
// 职责: 事实录入、排班执行、人工覆盖、导入导出、看板统计
// 规则:
// - 排班串行执行；计划与冲突清单一次性整体替换，外部不会看到半成品
// - 操作员动作（运行/覆盖/导入/关闭作业单）必须写审计，审计写入失败即报错
// - 先写审计再生效: 审计失败时计划与事实库保持原状
// - ensure_plan（查看时补算）不写审计
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::engine_config::EngineConfig;
use crate::domain::audit::{AuditAction, AuditEntry};
use crate::domain::conflict::Conflict;
use crate::domain::error::DomainResult;
use crate::domain::train::TrainId;
use crate::domain::types::{InductionAction, UserRole};
use crate::engine::scheduler::{InductionScheduler, SchedulerRun};
use crate::engine::stats::{self, BrandingStats, CleaningStats, FitnessStats, FleetSummary, JobCardStats, MileageStats, StablingStats};
use crate::export;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_mapper::{map_certificates, map_job_cards};
use crate::repository::audit_repo::AuditSink;
use crate::repository::fact_store::{FactSnapshot, FactSource, FactStore};

/// 手动执行排班的审计原因
pub const MANUAL_RUN_REASON: &str = "Manual scheduler execution";

/// 时钟（测试可注入固定时间）
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// 本地系统时钟
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// 固定时钟
pub fn fixed_clock(at: NaiveDateTime) -> Clock {
    Arc::new(move || at)
}

/// 操作员身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub user: String,
    pub role: UserRole,
}

impl Operator {
    pub fn new(user: impl Into<String>, role: UserRole) -> Self {
        Self {
            user: user.into(),
            role,
        }
    }
}

/// 导入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub ids: Vec<String>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> ApiResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| ApiError::InternalError(format!("{}锁获取失败: {}", what, e)))
}

// ==========================================
// InductionApi - 投运排班 API
// ==========================================
pub struct InductionApi {
    facts: Mutex<FactStore>,
    /// 持有即表示正在排班（串行化）
    scheduler: Mutex<InductionScheduler>,
    current: Mutex<Option<SchedulerRun>>,
    audit: Arc<dyn AuditSink>,
    clock: Clock,
}

impl InductionApi {
    pub fn new(scheduler: InductionScheduler, facts: FactStore, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            facts: Mutex::new(facts),
            scheduler: Mutex::new(scheduler),
            current: Mutex::new(None),
            audit,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    fn record(&self, entry: AuditEntry) -> ApiResult<()> {
        self.audit.record(&entry)?;
        Ok(())
    }

    // ==========================================
    // 事实
    // ==========================================

    /// 当前事实快照
    pub fn snapshot(&self) -> ApiResult<FactSnapshot> {
        Ok(lock(&self.facts, "事实库")?.snapshot())
    }

    /// 提交事实（录入方自行处理校验错误）
    pub fn update_facts<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&mut FactStore) -> DomainResult<T>,
    {
        let mut store = lock(&self.facts, "事实库")?;
        Ok(f(&mut *store)?)
    }

    /// 关闭作业单（审计）
    pub fn close_job_card(&self, operator: &Operator, job_card_id: &str) -> ApiResult<bool> {
        let mut store = lock(&self.facts, "事实库")?;
        let mut staged = store.clone();
        if !staged.close_job_card(job_card_id)? {
            return Ok(false);
        }
        let card = staged
            .job_card(job_card_id)
            .ok_or_else(|| ApiError::NotFound(format!("JobCard(id={})不存在", job_card_id)))?;

        self.record(
            AuditEntry::for_action(
                &operator.user,
                operator.role,
                AuditAction::CloseJobCard,
                &format!("Closed {}", card.job_card_code),
            )
            .with_train(card.train_id.clone()),
        )?;

        *store = staged;
        Ok(true)
    }

    // ==========================================
    // 排班
    // ==========================================

    fn compute(&self, scheduler: &InductionScheduler) -> ApiResult<SchedulerRun> {
        let facts = self.snapshot()?;
        Ok(scheduler.run(&facts, self.now()))
    }

    fn publish(&self, run: &SchedulerRun) -> ApiResult<()> {
        *lock(&self.current, "计划")? = Some(run.clone());
        Ok(())
    }

    /// 操作员触发排班（审计）
    pub fn run_scheduler(&self, operator: &Operator) -> ApiResult<SchedulerRun> {
        // 持锁至发布，审计与发布之间不会插入其他排班
        let scheduler = lock(&self.scheduler, "排班")?;
        let run = self.compute(&scheduler)?;

        self.record(
            AuditEntry::for_action(
                &operator.user,
                operator.role,
                AuditAction::RunScheduler,
                MANUAL_RUN_REASON,
            )
            .with_snapshots(
                &serde_json::Value::Null,
                &json!({
                    "plan_id": run.plan.plan_id,
                    "trains": run.plan.len(),
                    "conflicts": run.conflicts.len(),
                }),
            ),
        )?;
        self.publish(&run)?;
        drop(scheduler);

        info!(user = %operator.user, plan_id = %run.plan.plan_id, "操作员执行排班");
        Ok(run)
    }

    /// 查看时补算: 尚无计划则执行一次（不写审计）
    pub fn ensure_plan(&self) -> ApiResult<SchedulerRun> {
        let scheduler = lock(&self.scheduler, "排班")?;
        if let Some(run) = lock(&self.current, "计划")?.clone() {
            return Ok(run);
        }
        let run = self.compute(&scheduler)?;
        self.publish(&run)?;
        Ok(run)
    }

    /// 当前计划（可能尚未生成）
    pub fn current_run(&self) -> ApiResult<Option<SchedulerRun>> {
        Ok(lock(&self.current, "计划")?.clone())
    }

    pub fn conflicts(&self) -> ApiResult<Vec<Conflict>> {
        Ok(self.ensure_plan()?.conflicts)
    }

    /// 更新引擎配置；旧计划作废，下次查看时按新配置重算
    pub fn reconfigure(&self, config: EngineConfig) -> ApiResult<()> {
        config.validate()?;
        let mut scheduler = lock(&self.scheduler, "排班")?;
        info!(mode = %config.mode, cost_model = %config.cost_model, "更新排班配置");
        *scheduler = InductionScheduler::new(config);
        *lock(&self.current, "计划")? = None;
        Ok(())
    }

    pub fn config(&self) -> ApiResult<EngineConfig> {
        Ok(lock(&self.scheduler, "排班")?.config().clone())
    }

    // ==========================================
    // 人工覆盖
    // ==========================================

    /// 记录人工覆盖（计划本身不修改，下次排班整体重算）
    pub fn apply_override(
        &self,
        operator: &Operator,
        train_id: &TrainId,
        action: InductionAction,
        reason: &str,
    ) -> ApiResult<AuditEntry> {
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput("人工覆盖必须填写原因".to_string()));
        }

        let run = self.ensure_plan()?;
        let entry = run
            .plan
            .entry_for(train_id)
            .ok_or_else(|| ApiError::NotFound(format!("列车{}不在当前计划中", train_id)))?;

        let audit = AuditEntry::for_action(
            &operator.user,
            operator.role,
            AuditAction::ManualOverride,
            reason.trim(),
        )
        .with_train(train_id.clone())
        .with_snapshots(
            entry,
            &json!({
                "train_id": train_id,
                "recommended_action": action,
            }),
        );
        self.record(audit.clone())?;

        warn!(
            user = %operator.user,
            train_id = %train_id,
            from = %entry.recommended_action,
            to = %action,
            "人工覆盖投运建议"
        );
        Ok(audit)
    }

    // ==========================================
    // 导入（整表校验通过才写入）
    // ==========================================

    pub fn import_job_cards<P: AsRef<Path>>(&self, operator: &Operator, path: P) -> ApiResult<ImportSummary> {
        let table = UniversalFileParser.parse(path.as_ref())?;
        let drafts = map_job_cards(&table, &operator.user)?;
        self.apply_import(operator, "job_cards", path.as_ref(), |store| {
            store.add_job_cards(drafts)
        })
    }

    pub fn import_certificates<P: AsRef<Path>>(&self, operator: &Operator, path: P) -> ApiResult<ImportSummary> {
        let table = UniversalFileParser.parse(path.as_ref())?;
        let drafts = map_certificates(&table, self.now().date())?;
        self.apply_import(operator, "certificates", path.as_ref(), |store| {
            store.add_certificates(drafts)
        })
    }

    /// 在副本上写入，审计成功后整体替换
    fn apply_import<F>(
        &self,
        operator: &Operator,
        kind: &str,
        path: &Path,
        apply: F,
    ) -> ApiResult<ImportSummary>
    where
        F: FnOnce(&mut FactStore) -> DomainResult<Vec<String>>,
    {
        let mut store = lock(&self.facts, "事实库")?;
        let mut staged = store.clone();
        let ids = apply(&mut staged)?;
        let imported = ids.len();
        self.record(
            AuditEntry::for_action(
                &operator.user,
                operator.role,
                AuditAction::ImportData,
                &format!("Imported {} records", imported),
            )
            .with_snapshots(
                &serde_json::Value::Null,
                &json!({ "kind": kind, "file": path.display().to_string(), "count": imported }),
            ),
        )?;
        *store = staged;

        info!(kind, imported, file = %path.display(), "导入完成");
        Ok(ImportSummary { imported, ids })
    }

    // ==========================================
    // 审计查询 / 导出
    // ==========================================

    pub fn audit_trail(&self, limit: usize) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.audit.list_recent(limit)?)
    }

    pub fn train_history(&self, train_id: &TrainId) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.audit.list_by_train(train_id)?)
    }

    pub fn export_plan<P: AsRef<Path>>(&self, path: P) -> ApiResult<()> {
        let run = self.ensure_plan()?;
        export::export_plan_to_file(&run.plan, path)?;
        Ok(())
    }

    pub fn audit_report_csv(&self) -> ApiResult<String> {
        let entries = self.audit.list_all()?;
        Ok(export::audit_to_csv_string(&entries)?)
    }

    // ==========================================
    // 看板统计
    // ==========================================

    pub fn fleet_summary(&self) -> ApiResult<FleetSummary> {
        Ok(stats::fleet_summary(&self.ensure_plan()?.plan))
    }

    pub fn branding_stats(&self) -> ApiResult<BrandingStats> {
        Ok(stats::branding_stats(&self.snapshot()?, self.now()))
    }

    pub fn fitness_stats(&self) -> ApiResult<FitnessStats> {
        let config = self.config()?;
        Ok(stats::fitness_stats(&self.snapshot()?, self.now(), &config))
    }

    pub fn job_card_stats(&self) -> ApiResult<JobCardStats> {
        Ok(stats::job_card_stats(&self.snapshot()?, self.now()))
    }

    pub fn mileage_stats(&self) -> ApiResult<MileageStats> {
        let config = self.config()?;
        Ok(stats::mileage_stats(&self.snapshot()?, &config))
    }

    pub fn cleaning_stats(&self) -> ApiResult<CleaningStats> {
        Ok(stats::cleaning_stats(&self.snapshot()?, self.now()))
    }

    pub fn stabling_stats(&self) -> ApiResult<StablingStats> {
        Ok(stats::stabling_stats(&self.snapshot()?, self.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::certificate::CertificateDraft;
    use crate::domain::job_card::JobCardDraft;
    use crate::domain::types::{Department, JobCategory, JobPriority, RiskLevel};
    use crate::engine::cost::FixedCostEstimator;
    use crate::repository::audit_repo::InMemoryAuditSink;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use chrono::NaiveDate;
    use std::io::Write;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
    }

    fn api_with(facts: FactStore) -> (InductionApi, Arc<InMemoryAuditSink>) {
        let sink = Arc::new(InMemoryAuditSink::new());
        let config = EngineConfig {
            fleet_size: 3,
            ..EngineConfig::default()
        };
        let scheduler = InductionScheduler::with_estimator(config, Box::new(FixedCostEstimator(100)));
        let api = InductionApi::new(scheduler, facts, sink.clone())
            .with_clock(fixed_clock(today().and_hms_opt(8, 0, 0).unwrap()));
        (api, sink)
    }

    fn supervisor() -> Operator {
        Operator::new("supervisor", UserRole::DepotSupervisor)
    }

    fn scenario() -> FactStore {
        let mut store = FactStore::new();
        store
            .add_job_card(JobCardDraft {
                train_id: TrainId::new("T001"),
                job_card_code: "JOB2001".to_string(),
                category: JobCategory::Preventive,
                priority: JobPriority::High,
                issue_date: today(),
                target_completion_date: today(),
                due_date: today(),
                created_by: "user1".to_string(),
            })
            .unwrap();
        store
            .add_certificate(CertificateDraft {
                certificate_code: "FIT002".to_string(),
                train_id: TrainId::new("T002"),
                department: Department::RollingStock,
                valid_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                valid_to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                remarks: String::new(),
                created_date: today(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_ensure_plan_not_audited() {
        let (api, sink) = api_with(scenario());
        assert!(api.current_run().unwrap().is_none());

        let run = api.ensure_plan().unwrap();
        assert_eq!(run.plan.len(), 3);
        assert!(sink.list_all().unwrap().is_empty());

        // 第二次直接返回同一计划
        let again = api.ensure_plan().unwrap();
        assert_eq!(again.plan.plan_id, run.plan.plan_id);
    }

    #[test]
    fn test_run_scheduler_audited() {
        let (api, sink) = api_with(scenario());
        let run = api.run_scheduler(&supervisor()).unwrap();

        let entries = sink.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "Run Scheduler");
        assert_eq!(entries[0].reason, MANUAL_RUN_REASON);
        assert_eq!(
            api.current_run().unwrap().unwrap().plan.plan_id,
            run.plan.plan_id
        );
    }

    #[test]
    fn test_override_records_before_and_after() {
        let (api, sink) = api_with(scenario());
        let audit = api
            .apply_override(
                &supervisor(),
                &TrainId::new("T003"),
                InductionAction::Service,
                "Certificate renewed on paper",
            )
            .unwrap();

        assert_eq!(audit.train_id, Some(TrainId::new("T003")));
        let before = audit.before_snapshot.unwrap();
        assert_eq!(before["recommended_action"], "Standby");
        assert_eq!(audit.after_snapshot.unwrap()["recommended_action"], "Service");
        assert_eq!(sink.list_by_train(&TrainId::new("T003")).unwrap().len(), 1);

        // 计划不被覆盖修改
        let run = api.current_run().unwrap().unwrap();
        let entry = run.plan.entry_for(&TrainId::new("T003")).unwrap();
        assert_eq!(entry.recommended_action, InductionAction::Standby);
        assert_eq!(entry.predicted_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_override_requires_reason_and_known_train() {
        let (api, _) = api_with(scenario());
        assert!(matches!(
            api.apply_override(&supervisor(), &TrainId::new("T001"), InductionAction::Service, "  "),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.apply_override(&supervisor(), &TrainId::new("T099"), InductionAction::Service, "x"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_import_all_or_nothing() {
        let (api, sink) = api_with(FactStore::new());
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Train_ID,Fit_ID,Dept,Valid_From,Valid_To").unwrap();
        writeln!(file, "T001,FIT001,RollingStock,2025-01-01,2025-12-31").unwrap();
        writeln!(file, "T002,FIT002,Mechanical,2025-01-01,2025-12-31").unwrap();

        let err = api.import_certificates(&supervisor(), file.path()).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { .. }));
        assert!(api.snapshot().unwrap().certificates.is_empty());
        assert!(sink.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_import_certificates_audited() {
        let (api, sink) = api_with(FactStore::new());
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Train_ID,Fit_ID,Dept,Valid_From,Valid_To,Remarks").unwrap();
        writeln!(file, "T001,FIT001,RollingStock,2025-01-01,2025-12-31,ok").unwrap();
        writeln!(file, "T002,FIT002,Telecom,2025-01-01,2025-12-31,").unwrap();

        let summary = api.import_certificates(&supervisor(), file.path()).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(api.snapshot().unwrap().certificates.len(), 2);

        let entries = sink.list_all().unwrap();
        assert_eq!(entries[0].action, "Import Data");
        assert_eq!(entries[0].reason, "Imported 2 records");
    }

    #[test]
    fn test_close_job_card_then_rerun() {
        let (api, sink) = api_with(scenario());
        let id = api.snapshot().unwrap().job_cards[0].id.clone();

        assert!(api.close_job_card(&supervisor(), &id).unwrap());
        assert!(!api.close_job_card(&supervisor(), &id).unwrap());
        assert_eq!(sink.list_all().unwrap().len(), 1);

        let run = api.run_scheduler(&supervisor()).unwrap();
        let t001 = run.plan.entry_for(&TrainId::new("T001")).unwrap();
        assert_ne!(t001.recommended_action, InductionAction::Ibl);
    }

    /// 审计库不可写
    struct UnwritableSink;

    impl AuditSink for UnwritableSink {
        fn record(&self, _entry: &AuditEntry) -> RepositoryResult<()> {
            Err(RepositoryError::DatabaseQueryError("disk full".to_string()))
        }

        fn list_recent(&self, _limit: usize) -> RepositoryResult<Vec<AuditEntry>> {
            Ok(Vec::new())
        }

        fn list_by_train(&self, _train_id: &TrainId) -> RepositoryResult<Vec<AuditEntry>> {
            Ok(Vec::new())
        }

        fn list_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
            Ok(Vec::new())
        }
    }

    fn api_without_audit(facts: FactStore) -> InductionApi {
        let scheduler = InductionScheduler::with_estimator(
            EngineConfig {
                fleet_size: 3,
                ..EngineConfig::default()
            },
            Box::new(FixedCostEstimator(100)),
        );
        InductionApi::new(scheduler, facts, Arc::new(UnwritableSink))
            .with_clock(fixed_clock(today().and_hms_opt(8, 0, 0).unwrap()))
    }

    #[test]
    fn test_audit_failure_keeps_previous_plan() {
        let api = api_without_audit(scenario());

        let err = api.run_scheduler(&supervisor()).unwrap_err();
        assert!(matches!(err, ApiError::DatabaseError(_)));
        assert!(api.current_run().unwrap().is_none());

        // 已有计划时失败的排班不替换它
        let shown = api.ensure_plan().unwrap();
        assert!(api.run_scheduler(&supervisor()).is_err());
        assert_eq!(
            api.current_run().unwrap().unwrap().plan.plan_id,
            shown.plan.plan_id
        );
    }

    #[test]
    fn test_audit_failure_leaves_facts_untouched() {
        let api = api_without_audit(scenario());

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Train_ID,Fit_ID,Dept,Valid_From,Valid_To").unwrap();
        writeln!(file, "T003,FIT003,RollingStock,2025-01-01,2025-12-31").unwrap();
        assert!(api.import_certificates(&supervisor(), file.path()).is_err());
        assert_eq!(api.snapshot().unwrap().certificates.len(), 1);

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Train_ID,Job_Card_ID,Job_Category,Issue_Date,Target_Completion_Date").unwrap();
        writeln!(file, "T002,JOB2005,HVAC,2025-01-18,2025-01-28").unwrap();
        assert!(api.import_job_cards(&supervisor(), file.path()).is_err());
        assert_eq!(api.snapshot().unwrap().job_cards.len(), 1);

        let id = api.snapshot().unwrap().job_cards[0].id.clone();
        assert!(api.close_job_card(&supervisor(), &id).is_err());
        assert!(api.snapshot().unwrap().job_cards[0].is_open());
    }

    #[test]
    fn test_reconfigure_invalidates_plan() {
        let (api, _) = api_with(scenario());
        api.ensure_plan().unwrap();
        api.reconfigure(EngineConfig::default().weighted()).unwrap();
        assert!(api.current_run().unwrap().is_none());
        assert_eq!(api.fleet_summary().unwrap().total, 25);
    }
}
