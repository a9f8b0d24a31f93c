use super::core::AuditLogRepository;
use super::AuditSink;
use crate::domain::audit::AuditEntry;
use crate::domain::train::TrainId;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT audit_id, user_name, role, ts, action, reason,
           train_id, before_json, after_json
    FROM audit_log
"#;

/// 原始行（字符串形态，转换在 SQLite 闭包外完成）
struct AuditRow {
    audit_id: String,
    user_name: String,
    role: String,
    ts: String,
    action: String,
    reason: String,
    train_id: Option<String>,
    before_json: Option<String>,
    after_json: Option<String>,
}

impl AuditRow {
    fn from_row(row: &Row) -> SqliteResult<Self> {
        Ok(Self {
            audit_id: row.get(0)?,
            user_name: row.get(1)?,
            role: row.get(2)?,
            ts: row.get(3)?,
            action: row.get(4)?,
            reason: row.get(5)?,
            train_id: row.get(6)?,
            before_json: row.get(7)?,
            after_json: row.get(8)?,
        })
    }

    fn into_entry(self) -> RepositoryResult<AuditEntry> {
        let role = UserRole::from_str(&self.role).ok_or_else(|| RepositoryError::FieldValueError {
            field: "role".to_string(),
            message: format!("未知角色: {}", self.role),
        })?;
        let timestamp = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| RepositoryError::FieldValueError {
                field: "ts".to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(AuditEntry {
            id: self.audit_id,
            user: self.user_name,
            role,
            timestamp,
            action: self.action,
            reason: self.reason,
            train_id: self.train_id.map(TrainId::new),
            before_snapshot: self
                .before_json
                .map(|raw| serde_json::from_str(&raw))
                .transpose()?,
            after_snapshot: self
                .after_json
                .map(|raw| serde_json::from_str(&raw))
                .transpose()?,
        })
    }
}

impl AuditLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    fn query_entries(
        &self,
        clause: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<AuditEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} {}", SELECT_COLUMNS, clause);
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params, AuditRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(AuditRow::into_entry).collect()
    }

    /// 按 audit_id 查询
    pub fn find_by_id(&self, audit_id: &str) -> RepositoryResult<Option<AuditEntry>> {
        let mut found = self.query_entries("WHERE audit_id = ?", params![audit_id])?;
        Ok(found.pop())
    }

    /// 按操作标签查询（新在前）
    pub fn find_by_action(&self, action: &str, limit: usize) -> RepositoryResult<Vec<AuditEntry>> {
        self.query_entries(
            "WHERE action = ? ORDER BY seq DESC LIMIT ?",
            params![action, limit as i64],
        )
    }

    /// 审计总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl AuditSink for AuditLogRepository {
    fn record(&self, entry: &AuditEntry) -> RepositoryResult<()> {
        self.insert(entry).map(|_| ())
    }

    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<AuditEntry>> {
        self.query_entries("ORDER BY seq DESC LIMIT ?", params![limit as i64])
    }

    fn list_by_train(&self, train_id: &TrainId) -> RepositoryResult<Vec<AuditEntry>> {
        self.query_entries(
            "WHERE train_id = ? ORDER BY seq DESC",
            params![train_id.as_str()],
        )
    }

    fn list_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
        self.query_entries("ORDER BY seq ASC", params![])
    }
}
