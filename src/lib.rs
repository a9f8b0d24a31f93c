// ==========================================
// 列车投运排班系统 - 核心库
// ==========================================
// 职责: 根据作业单、适用证书、广告、清洗、里程、股位等事实，
//       为车队每列车给出次日投运建议（Service / Standby / IBL）
// 系统定位: 决策支持系统（人工保留覆盖权，覆盖必须留痕）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 事实库与审计
pub mod repository;

// 引擎层 - 投运决策规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出 - 计划/审计 CSV
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{InductionAction, RiskLevel, Severity, UserRole};

// 领域实体
pub use domain::{
    AuditEntry, Conflict, Fleet, InductionPlan, InductionPlanEntry, TrainId,
};

// 事实库
pub use repository::{AuditSink, FactSnapshot, FactSource, FactStore};

// 引擎
pub use engine::{
    ConflictDetector, InductionClassifier, InductionRanker, InductionScheduler, SchedulerRun,
};

// 配置
pub use config::{ConfigManager, EngineConfig};

// API
pub use api::{ApiError, InductionApi, Operator};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const SYSTEM_NAME: &str = "列车投运排班系统";
