// ==========================================
// 列车投运排班系统 - API 层
// ==========================================
// 职责: 面向操作员的业务接口（排班、覆盖、导入导出、统计），写审计
// ==========================================

pub mod error;
pub mod induction_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use induction_api::{fixed_clock, system_clock, Clock, ImportSummary, InductionApi, Operator};
