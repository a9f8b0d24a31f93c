// ==========================================
// 列车投运排班系统 - 适用证书领域模型
// ==========================================
// 红线: 有效性永远由日期区间与当前日期实时计算，不持久化状态字段
// 生命周期: 创建后不可变
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use crate::domain::types::Department;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateDraft {
    pub certificate_code: String,
    pub train_id: TrainId,
    pub department: Department,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub remarks: String,
    pub created_date: NaiveDate,
}

impl CertificateDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.train_id.as_str().is_empty() {
            return Err(DomainError::MissingField("train_id".to_string()));
        }
        if self.certificate_code.trim().is_empty() {
            return Err(DomainError::MissingField("certificate_code".to_string()));
        }
        if self.valid_from > self.valid_to {
            return Err(DomainError::InvalidDateRange {
                field: "valid_to".to_string(),
                start: self.valid_from.to_string(),
                end: self.valid_to.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// FitnessCertificate - 适用证书
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessCertificate {
    pub id: String,
    pub certificate_code: String,
    pub train_id: TrainId,
    pub department: Department,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub remarks: String,
    pub created_date: NaiveDate,
}

impl FitnessCertificate {
    pub fn from_draft(id: String, draft: CertificateDraft) -> Self {
        Self {
            id,
            certificate_code: draft.certificate_code.trim().to_string(),
            train_id: draft.train_id,
            department: draft.department,
            valid_from: draft.valid_from,
            valid_to: draft.valid_to,
            remarks: draft.remarks,
            created_date: draft.created_date,
        }
    }

    /// 指定日期是否有效（两端包含）
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.valid_from <= today && today <= self.valid_to
    }

    /// 是否已过期
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.valid_to < today
    }

    /// 距离到期的天数（已过期为负数）
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        self.valid_to.signed_duration_since(today).num_days()
    }
}
