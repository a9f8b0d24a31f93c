// ==========================================
// 列车投运排班系统 - 里程记录领域模型
// ==========================================
// 红线: 每列车至多一条当前记录，提交时按车号覆盖（upsert）
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MileageDraft {
    pub train_id: TrainId,
    pub daily_km: f64,
    pub km_since_maintenance: f64,
    pub reading_date: NaiveDate,
}

impl MileageDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.train_id.as_str().is_empty() {
            return Err(DomainError::MissingField("train_id".to_string()));
        }
        if self.daily_km < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "daily_km".to_string(),
                value: self.daily_km,
            });
        }
        if self.km_since_maintenance < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "km_since_maintenance".to_string(),
                value: self.km_since_maintenance,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageData {
    pub id: String,
    pub train_id: TrainId,
    pub daily_km: f64,
    pub km_since_maintenance: f64,
    pub reading_date: NaiveDate,
}

impl MileageData {
    pub fn from_draft(id: String, draft: MileageDraft) -> Self {
        Self {
            id,
            train_id: draft.train_id,
            daily_km: draft.daily_km,
            km_since_maintenance: draft.km_since_maintenance,
            reading_date: draft.reading_date,
        }
    }
}
