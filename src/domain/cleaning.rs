// ==========================================
// 列车投运排班系统 - 清洗记录领域模型
// ==========================================
// 生命周期: 只追加，不更新、不删除
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use crate::domain::types::{CleaningTrack, CleaningType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningDraft {
    pub train_id: TrainId,
    pub cleaning_type: CleaningType,
    pub track: CleaningTrack,
    pub issue_date: NaiveDate,
    pub completion_date: NaiveDate,
    pub submitted_at: NaiveDateTime,
}

impl CleaningDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.train_id.as_str().is_empty() {
            return Err(DomainError::MissingField("train_id".to_string()));
        }
        if self.completion_date < self.issue_date {
            return Err(DomainError::InvalidDateRange {
                field: "completion_date".to_string(),
                start: self.issue_date.to_string(),
                end: self.completion_date.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningData {
    pub id: String,
    pub train_id: TrainId,
    pub cleaning_type: CleaningType,
    pub track: CleaningTrack,
    pub issue_date: NaiveDate,
    pub completion_date: NaiveDate,
    pub submitted_at: NaiveDateTime,
}

impl CleaningData {
    pub fn from_draft(id: String, draft: CleaningDraft) -> Self {
        Self {
            id,
            train_id: draft.train_id,
            cleaning_type: draft.cleaning_type,
            track: draft.track,
            issue_date: draft.issue_date,
            completion_date: draft.completion_date,
            submitted_at: draft.submitted_at,
        }
    }

    /// 距今完成天数
    pub fn days_since_completion(&self, today: NaiveDate) -> i64 {
        today.signed_duration_since(self.completion_date).num_days()
    }

    pub fn submission_date(&self) -> NaiveDate {
        self.submitted_at.date()
    }
}
