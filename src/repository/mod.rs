// ==========================================
// 列车投运排班系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责:
// - fact_store: 车队事实（内存），为引擎提供一致快照
// - audit_repo: 审计日志（SQLite / 内存），只追加
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod audit_repo;
pub mod error;
pub mod fact_store;

// 重导出核心仓储
pub use audit_repo::{AuditLogRepository, AuditSink, InMemoryAuditSink};
pub use error::{RepositoryError, RepositoryResult};
pub use fact_store::{FactSnapshot, FactSource, FactStore};
