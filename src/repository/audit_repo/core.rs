use crate::domain::audit::AuditEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// AuditLogRepository - 审计日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    /// 创建新的审计日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入审计条目
    ///
    /// # 返回
    /// - `Ok(audit_id)`: 成功插入
    /// - `Err(UniqueConstraintViolation)`: ID 重复（审计不可覆盖）
    pub fn insert(&self, entry: &AuditEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        // seq 保证同一毫秒内的写入顺序
        let seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM audit_log",
            [],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO audit_log (
                audit_id, user_name, role, ts, action, reason,
                train_id, before_json, after_json, seq
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.id,
                entry.user,
                entry.role.to_db_str(),
                entry.timestamp_iso(),
                entry.action,
                entry.reason,
                entry.train_id.as_ref().map(|t| t.as_str().to_string()),
                entry.before_snapshot.as_ref().map(|v| v.to_string()),
                entry.after_snapshot.as_ref().map(|v| v.to_string()),
                seq,
            ],
        )?;

        debug!(audit_id = %entry.id, action = %entry.action, seq, "写入审计日志");
        Ok(entry.id.clone())
    }

    /// 批量插入（单事务）
    pub fn batch_insert(&self, entries: &[AuditEntry]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq), 0) FROM audit_log",
            [],
            |row| row.get(0),
        )?;

        let mut count = 0;
        for entry in entries {
            seq += 1;
            tx.execute(
                r#"
                INSERT INTO audit_log (
                    audit_id, user_name, role, ts, action, reason,
                    train_id, before_json, after_json, seq
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    entry.id,
                    entry.user,
                    entry.role.to_db_str(),
                    entry.timestamp_iso(),
                    entry.action,
                    entry.reason,
                    entry.train_id.as_ref().map(|t| t.as_str().to_string()),
                    entry.before_snapshot.as_ref().map(|v| v.to_string()),
                    entry.after_snapshot.as_ref().map(|v| v.to_string()),
                    seq,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }
}
