// ==========================================
// 列车投运排班系统 - 审计日志领域模型
// ==========================================
// 红线: 只追加，不修改、不删除（合规追溯）
// 写入方: 服务层在调用引擎前后记录，引擎本身从不写审计
// ==========================================

use crate::domain::train::TrainId;
use crate::domain::types::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ==========================================
// AuditAction - 常用操作标签
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    RunScheduler,   // 运行排班
    ManualOverride, // 人工覆盖
    ImportData,     // 数据导入
    CloseJobCard,   // 关闭作业单
}

impl AuditAction {
    /// 展示与存储用标签
    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::RunScheduler => "Run Scheduler",
            AuditAction::ManualOverride => "Manual Override",
            AuditAction::ImportData => "Import Data",
            AuditAction::CloseJobCard => "Close Job Card",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Run Scheduler" => Some(AuditAction::RunScheduler),
            "Manual Override" => Some(AuditAction::ManualOverride),
            "Import Data" => Some(AuditAction::ImportData),
            "Close Job Card" => Some(AuditAction::CloseJobCard),
            _ => None,
        }
    }
}

// ==========================================
// AuditEntry - 审计条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub user: String,
    pub role: UserRole,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_id: Option<TrainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_snapshot: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_snapshot: Option<JsonValue>,
}

impl AuditEntry {
    /// 创建新的审计条目（ID 与时间戳自动生成）
    pub fn new(user: &str, role: UserRole, action: &str, reason: &str) -> Self {
        Self {
            id: format!("audit_{}", Uuid::new_v4()),
            user: user.to_string(),
            role,
            timestamp: Utc::now(),
            action: action.to_string(),
            reason: reason.to_string(),
            train_id: None,
            before_snapshot: None,
            after_snapshot: None,
        }
    }

    pub fn for_action(user: &str, role: UserRole, action: AuditAction, reason: &str) -> Self {
        Self::new(user, role, action.label(), reason)
    }

    pub fn with_train(mut self, train_id: TrainId) -> Self {
        self.train_id = Some(train_id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 设置前后快照 (转换为JSON)
    pub fn with_snapshots<B: Serialize, A: Serialize>(mut self, before: &B, after: &A) -> Self {
        self.before_snapshot = serde_json::to_value(before).ok();
        self.after_snapshot = serde_json::to_value(after).ok();
        self
    }

    /// ISO-8601 时间戳
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}
