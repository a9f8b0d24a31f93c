// ==========================================
// 列车投运排班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生谓词（有效性/SLA/阻断）
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod audit;
pub mod branding;
pub mod certificate;
pub mod cleaning;
pub mod conflict;
pub mod error;
pub mod job_card;
pub mod mileage;
pub mod plan;
pub mod stabling;
pub mod train;
pub mod types;

// 重导出核心类型
pub use audit::{AuditAction, AuditEntry};
pub use branding::{BrandingDraft, BrandingWindow, SlaSnapshot};
pub use certificate::{CertificateDraft, FitnessCertificate};
pub use cleaning::{CleaningData, CleaningDraft};
pub use conflict::Conflict;
pub use error::{DomainError, DomainResult};
pub use job_card::{JobCard, JobCardDraft};
pub use mileage::{MileageData, MileageDraft};
pub use plan::{Classification, ClassifierMode, InductionPlan, InductionPlanEntry};
pub use stabling::{SlotPosition, StablingDraft, StablingGeometry, StablingTrack};
pub use train::{Fleet, TrainId, DEFAULT_FLEET_SIZE};
pub use types::{
    CleaningTrack, CleaningType, ConflictType, Department, InductionAction, JobCategory,
    JobPriority, JobStatus, RiskLevel, Severity, SlaStatus, StablingStatus, UserRole,
};
