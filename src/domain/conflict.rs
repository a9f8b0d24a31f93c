// ==========================================
// 列车投运排班系统 - 冲突领域模型
// ==========================================
// 派生对象: 与投运计划一同整体重算
// ==========================================

use crate::domain::train::TrainId;
use crate::domain::types::{ConflictType, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub train_id: TrainId,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

impl Conflict {
    pub fn new(
        id: String,
        conflict_type: ConflictType,
        train_id: TrainId,
        severity: Severity,
        description: String,
    ) -> Self {
        Self {
            id,
            conflict_type,
            train_id,
            severity,
            description,
            related_id: None,
        }
    }

    /// 关联实体ID（作业单/广告窗口）
    pub fn with_related(mut self, related_id: impl Into<String>) -> Self {
        self.related_id = Some(related_id.into());
        self
    }
}
