// ==========================================
// 列车投运排班系统 - 广告涂装窗口领域模型
// ==========================================
// SLA 状态由当前时间实时派生:
// - now < start            → scheduled
// - start <= now <= end    → in-progress
// - now > end              → 窗口时长(小时) >= 要求小时数 ? completed : breached
// 风险预警: in-progress 且剩余小时 < 要求小时数的 20%
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use crate::domain::types::SlaStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 风险预警比例
pub const AT_RISK_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingDraft {
    pub brand_name: String,
    pub train_id: TrainId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub required_hours: f64,
    pub exposure_hours_completed: f64,
}

impl BrandingDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.brand_name.trim().is_empty() {
            return Err(DomainError::MissingField("brand_name".to_string()));
        }
        if self.end < self.start {
            return Err(DomainError::InvalidDateRange {
                field: "end".to_string(),
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        if self.required_hours < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "required_hours".to_string(),
                value: self.required_hours,
            });
        }
        if self.exposure_hours_completed < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "exposure_hours_completed".to_string(),
                value: self.exposure_hours_completed,
            });
        }
        Ok(())
    }
}

/// SLA 计算结果（展示用）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaSnapshot {
    pub status: SlaStatus,
    pub hours_remaining: i64,
    pub elapsed_hours: i64,
}

// ==========================================
// BrandingWindow - 广告窗口
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingWindow {
    pub id: String,
    pub brand_name: String,
    pub train_id: TrainId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub required_hours: f64,
    pub exposure_hours_completed: f64,
}

impl BrandingWindow {
    pub fn from_draft(id: String, draft: BrandingDraft) -> Self {
        Self {
            id,
            brand_name: draft.brand_name.trim().to_string(),
            train_id: draft.train_id,
            start: draft.start,
            end: draft.end,
            required_hours: draft.required_hours,
            exposure_hours_completed: draft.exposure_hours_completed,
        }
    }

    /// 窗口总时长（整小时，向零截断）
    pub fn window_hours(&self) -> i64 {
        (self.end - self.start).num_hours()
    }

    /// 计算当前 SLA 快照
    pub fn sla(&self, now: NaiveDateTime) -> SlaSnapshot {
        if now > self.end {
            let elapsed = self.window_hours();
            let status = if elapsed as f64 >= self.required_hours {
                SlaStatus::Completed
            } else {
                SlaStatus::Breached
            };
            SlaSnapshot {
                status,
                hours_remaining: 0,
                elapsed_hours: elapsed,
            }
        } else if now >= self.start {
            SlaSnapshot {
                status: SlaStatus::InProgress,
                hours_remaining: (self.end - now).num_hours(),
                elapsed_hours: (now - self.start).num_hours(),
            }
        } else {
            SlaSnapshot {
                status: SlaStatus::Scheduled,
                hours_remaining: self.window_hours(),
                elapsed_hours: 0,
            }
        }
    }

    pub fn sla_status(&self, now: NaiveDateTime) -> SlaStatus {
        self.sla(now).status
    }

    /// 进行中且剩余小时不足要求的 20%
    pub fn is_at_risk(&self, now: NaiveDateTime) -> bool {
        let sla = self.sla(now);
        sla.status == SlaStatus::InProgress
            && (sla.hours_remaining as f64) < self.required_hours * AT_RISK_RATIO
    }

    /// 重新上报已完成曝光小时数（覆盖旧值）
    pub fn record_exposure(&mut self, hours: f64) -> DomainResult<()> {
        if hours < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "exposure_hours_completed".to_string(),
                value: hours,
            });
        }
        self.exposure_hours_completed = hours;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn window(start: NaiveDateTime, end: NaiveDateTime, required: f64) -> BrandingWindow {
        BrandingWindow {
            id: "bw_1".to_string(),
            brand_name: "Metro Express".to_string(),
            train_id: TrainId::new("T005"),
            start,
            end,
            required_hours: required,
            exposure_hours_completed: 0.0,
        }
    }

    #[test]
    fn test_sla_states() {
        let w = window(at(10, 0), at(11, 0), 8.0);

        assert_eq!(w.sla_status(at(9, 12)), SlaStatus::Scheduled);
        assert_eq!(w.sla_status(at(10, 0)), SlaStatus::InProgress);
        assert_eq!(w.sla_status(at(11, 0)), SlaStatus::InProgress);
        // 窗口 24h >= 8h
        assert_eq!(w.sla_status(at(11, 1)), SlaStatus::Completed);

        let short = window(at(10, 0), at(10, 6), 8.0);
        assert_eq!(short.sla_status(at(10, 7)), SlaStatus::Breached);
    }

    #[test]
    fn test_at_risk_only_in_progress() {
        let w = window(at(10, 0), at(11, 0), 100.0);
        // 剩余 23h < 20h? 否
        assert!(!w.is_at_risk(at(10, 1)));
        // 剩余 19h < 20h
        assert!(w.is_at_risk(at(10, 5)));
        // 已结束不算预警
        assert!(!w.is_at_risk(at(11, 0) + Duration::hours(1)));
    }

    #[test]
    fn test_record_exposure() {
        let mut w = window(at(10, 0), at(11, 0), 8.0);
        w.record_exposure(6.0).unwrap();
        assert_eq!(w.exposure_hours_completed, 6.0);
        assert!(w.record_exposure(-1.0).is_err());
        assert_eq!(w.exposure_hours_completed, 6.0);
    }
}
