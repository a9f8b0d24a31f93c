// ==========================================
// 列车投运排班系统 - 作业单领域模型
// ==========================================
// 红线: blocking_induction ⇔ status == Open（读时派生，不单独存储）
// 生命周期: 创建即 Open → Closed（单向），永不删除
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use crate::domain::types::{JobCategory, JobPriority, JobStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 作业单编号起始值（JOB2001 起）
pub const JOB_CARD_CODE_BASE: u32 = 2000;

// ==========================================
// JobCardDraft - 新建作业单输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCardDraft {
    pub train_id: TrainId,
    pub job_card_code: String,
    pub category: JobCategory,
    pub priority: JobPriority,
    pub issue_date: NaiveDate,
    pub target_completion_date: NaiveDate,
    pub due_date: NaiveDate,
    pub created_by: String,
}

impl JobCardDraft {
    /// 校验必填字段
    pub fn validate(&self) -> DomainResult<()> {
        if self.train_id.as_str().is_empty() {
            return Err(DomainError::MissingField("train_id".to_string()));
        }
        if self.job_card_code.trim().is_empty() {
            return Err(DomainError::MissingField("job_card_code".to_string()));
        }
        if self.target_completion_date < self.issue_date {
            return Err(DomainError::InvalidDateRange {
                field: "target_completion_date".to_string(),
                start: self.issue_date.to_string(),
                end: self.target_completion_date.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// JobCard - 作业单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: String,
    pub train_id: TrainId,
    pub job_card_code: String,
    pub category: JobCategory,
    pub priority: JobPriority,
    pub issue_date: NaiveDate,
    pub target_completion_date: NaiveDate,
    pub due_date: NaiveDate,
    status: JobStatus,
    pub created_by: String,
}

impl JobCard {
    /// 由草稿创建作业单（状态固定为 Open）
    pub fn open(id: String, draft: JobCardDraft) -> Self {
        Self {
            id,
            train_id: draft.train_id,
            job_card_code: draft.job_card_code.trim().to_string(),
            category: draft.category,
            priority: draft.priority,
            issue_date: draft.issue_date,
            target_completion_date: draft.target_completion_date,
            due_date: draft.due_date,
            status: JobStatus::Open,
            created_by: draft.created_by,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }

    /// 是否阻断投运（随状态派生）
    pub fn blocking_induction(&self) -> bool {
        self.is_open()
    }

    /// 关闭作业单
    ///
    /// # 返回
    /// - true: 状态由 Open 变为 Closed
    /// - false: 已是 Closed，无变化
    pub fn close(&mut self) -> bool {
        if self.status == JobStatus::Closed {
            return false;
        }
        self.status = JobStatus::Closed;
        true
    }

    /// 是否逾期（仍 Open 且已过到期日）
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }

    /// 作业单编号数字部分: JOB2001 → 2001
    pub fn code_number(&self) -> Option<u32> {
        self.job_card_code
            .strip_prefix("JOB")
            .and_then(|digits| digits.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> JobCardDraft {
        JobCardDraft {
            train_id: TrainId::new("T001"),
            job_card_code: "JOB2001".to_string(),
            category: JobCategory::Preventive,
            priority: JobPriority::High,
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            target_completion_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            created_by: "user1".to_string(),
        }
    }

    #[test]
    fn test_blocking_follows_status() {
        let mut card = JobCard::open("jc_1".to_string(), draft());
        assert!(card.blocking_induction());

        assert!(card.close());
        assert_eq!(card.status(), JobStatus::Closed);
        assert!(!card.blocking_induction());

        // 重复关闭无变化
        assert!(!card.close());
        assert!(!card.blocking_induction());
    }

    #[test]
    fn test_overdue() {
        let card = JobCard::open("jc_1".to_string(), draft());
        assert!(!card.is_overdue(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()));
        assert!(card.is_overdue(NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()));
    }

    #[test]
    fn test_draft_validation() {
        let mut bad = draft();
        bad.job_card_code = "  ".to_string();
        assert_eq!(
            bad.validate(),
            Err(DomainError::MissingField("job_card_code".to_string()))
        );

        let mut reversed = draft();
        reversed.target_completion_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(
            reversed.validate(),
            Err(DomainError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_code_number() {
        let card = JobCard::open("jc_1".to_string(), draft());
        assert_eq!(card.code_number(), Some(2001));
    }
}
