// ==========================================
// 列车投运排班系统 - 审计日志仓储
// ==========================================
// 红线: 只追加，不提供修改/删除接口
// 实现:
// - AuditLogRepository: SQLite audit_log 表
// - InMemoryAuditSink: 进程内（测试/演示）
// ==========================================

mod core;
mod queries;


pub use self::core::AuditLogRepository;

use crate::domain::audit::AuditEntry;
use crate::domain::train::TrainId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::sync::Mutex;

// ==========================================
// AuditSink - 审计落点
// ==========================================
pub trait AuditSink: Send + Sync {
    /// 追加一条审计
    fn record(&self, entry: &AuditEntry) -> RepositoryResult<()>;

    /// 最近的审计（新在前）
    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<AuditEntry>>;

    /// 指定列车相关的审计（新在前）
    fn list_by_train(&self, train_id: &TrainId) -> RepositoryResult<Vec<AuditEntry>>;

    /// 全部审计（按写入顺序，用于导出报表）
    fn list_all(&self) -> RepositoryResult<Vec<AuditEntry>>;
}

// ==========================================
// InMemoryAuditSink
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Vec<AuditEntry>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: &AuditEntry) -> RepositoryResult<()> {
        self.guard()?.push(entry.clone());
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<AuditEntry>> {
        Ok(self.guard()?.iter().rev().take(limit).cloned().collect())
    }

    fn list_by_train(&self, train_id: &TrainId) -> RepositoryResult<Vec<AuditEntry>> {
        Ok(self
            .guard()?
            .iter()
            .rev()
            .filter(|e| e.train_id.as_ref() == Some(train_id))
            .cloned()
            .collect())
    }

    fn list_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
        Ok(self.guard()?.clone())
    }
}
