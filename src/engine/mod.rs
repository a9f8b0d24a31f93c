// ==========================================
// 列车投运排班系统 - 引擎层
// ==========================================
// 职责: 实现投运决策规则,只读快照
// 红线: Engine 不拼 SQL, 不写审计, 所有结论必须输出 reason
// ==========================================

pub mod classifier;
pub mod conflict;
pub mod cost;
pub mod ranker;
pub mod scheduler;
pub mod signals;
pub mod stats;

// 重导出核心引擎
pub use classifier::{
    InductionClassifier, REASON_ALL_CLEAR, REASON_MISSING_CERTIFICATE, REASON_OPEN_JOB_CARD,
};
pub use conflict::ConflictDetector;
pub use cost::{
    estimator_for, CostEstimator, FixedCostEstimator, RandomCostEstimator, StablingCostEstimator,
};
pub use ranker::InductionRanker;
pub use scheduler::{InductionScheduler, SchedulerRun};
pub use signals::{RiskSignal, ScoreBreakdown, SignalContext, SignalReading, WeightedScorer};
pub use stats::{
    BrandingStats, CleaningStats, FitnessStats, FleetSummary, JobCardStats, MileageStats,
    StablingStats,
};
