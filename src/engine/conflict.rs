// ==========================================
// 列车投运排班系统 - 冲突检测引擎
// ==========================================
// 职责: 扫描快照，输出类型化冲突清单（无序）
// 规则:
// - 每张 Open 作业单          → open_job_card (High)
// - 车队中无有效证书的列车    → missing_certificate (Medium)
// - SLA 已违约的广告窗口      → branding_sla_breach (High)
// - 清洗超期（需配置开启）    → cleaning_not_scheduled (Low)
// 红线: 纯函数，不修改快照
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::conflict::Conflict;
use crate::domain::train::Fleet;
use crate::domain::types::{ConflictType, Severity, SlaStatus};
use crate::repository::fact_store::FactSnapshot;
use chrono::NaiveDateTime;
use tracing::debug;

pub struct ConflictDetector {
    detect_cleaning_gaps: bool,
    cleaning_staleness_days: i64,
}

impl ConflictDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            detect_cleaning_gaps: config.detect_cleaning_gaps,
            cleaning_staleness_days: config.cleaning_staleness_days,
        }
    }

    pub fn detect(&self, fleet: &Fleet, facts: &FactSnapshot, now: NaiveDateTime) -> Vec<Conflict> {
        let today = now.date();
        let mut conflicts = Vec::new();

        // ===== 作业单 =====
        for card in facts.open_job_cards() {
            conflicts.push(
                Conflict::new(
                    format!("conflict_{}", card.id),
                    ConflictType::OpenJobCard,
                    card.train_id.clone(),
                    Severity::High,
                    format!("Open job card {} blocking induction", card.job_card_code),
                )
                .with_related(card.id.clone()),
            );
        }

        // ===== 适用证书 =====
        for train_id in fleet.iter() {
            if !facts.has_valid_certificate(train_id, today) {
                conflicts.push(Conflict::new(
                    format!("conflict_cert_{}", train_id),
                    ConflictType::MissingCertificate,
                    train_id.clone(),
                    Severity::Medium,
                    format!("Missing or expired fitness certificate for {}", train_id),
                ));
            }
        }

        // ===== 广告 SLA =====
        for window in &facts.branding_windows {
            if window.sla_status(now) == SlaStatus::Breached {
                conflicts.push(
                    Conflict::new(
                        format!("conflict_brand_{}", window.id),
                        ConflictType::BrandingSlaBreach,
                        window.train_id.clone(),
                        Severity::High,
                        format!(
                            "Branding SLA breached for {} on {} ({} of {} required hours)",
                            window.brand_name,
                            window.train_id,
                            window.window_hours(),
                            window.required_hours
                        ),
                    )
                    .with_related(window.id.clone()),
                );
            }
        }

        // ===== 清洗 =====
        if self.detect_cleaning_gaps {
            for train_id in fleet.iter() {
                let recent = facts
                    .latest_cleaning(train_id)
                    .map(|c| c.days_since_completion(today) <= self.cleaning_staleness_days)
                    .unwrap_or(false);
                if !recent {
                    conflicts.push(Conflict::new(
                        format!("conflict_clean_{}", train_id),
                        ConflictType::CleaningNotScheduled,
                        train_id.clone(),
                        Severity::Low,
                        format!(
                            "No cleaning completed for {} in the last {} days",
                            train_id, self.cleaning_staleness_days
                        ),
                    ));
                }
            }
        }

        debug!(conflict_count = conflicts.len(), "冲突检测完成");
        conflicts
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branding::BrandingDraft;
    use crate::domain::certificate::CertificateDraft;
    use crate::domain::cleaning::CleaningDraft;
    use crate::domain::job_card::JobCardDraft;
    use crate::domain::train::TrainId;
    use crate::domain::types::{CleaningTrack, CleaningType, Department, JobCategory, JobPriority};
    use crate::repository::fact_store::{FactSource, FactStore};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(20).and_hms_opt(9, 0, 0).unwrap()
    }

    fn count(conflicts: &[Conflict], kind: ConflictType) -> usize {
        conflicts.iter().filter(|c| c.conflict_type == kind).count()
    }

    fn facts() -> FactSnapshot {
        let mut store = FactStore::new();
        for (train, code) in [("T001", "JOB2001"), ("T003", "JOB2002")] {
            store
                .add_job_card(JobCardDraft {
                    train_id: TrainId::new(train),
                    job_card_code: code.to_string(),
                    category: JobCategory::Brake,
                    priority: JobPriority::High,
                    issue_date: date(10),
                    target_completion_date: date(25),
                    due_date: date(22),
                    created_by: "jc_manager".to_string(),
                })
                .unwrap();
        }
        store
            .add_certificate(CertificateDraft {
                certificate_code: "FIT001".to_string(),
                train_id: TrainId::new("T001"),
                department: Department::RollingStock,
                valid_from: date(1),
                valid_to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                remarks: String::new(),
                created_date: date(1),
            })
            .unwrap();
        // 窗口 48 小时，要求 100 小时，已结束 → 违约
        store
            .add_branding_window(BrandingDraft {
                brand_name: "Coca-Cola".to_string(),
                train_id: TrainId::new("T005"),
                start: date(10).and_hms_opt(0, 0, 0).unwrap(),
                end: date(12).and_hms_opt(0, 0, 0).unwrap(),
                required_hours: 100.0,
                exposure_hours_completed: 20.0,
            })
            .unwrap();
        store
            .add_cleaning(CleaningDraft {
                train_id: TrainId::new("T002"),
                cleaning_type: CleaningType::Deep,
                track: CleaningTrack::M1,
                issue_date: date(18),
                completion_date: date(18),
                submitted_at: date(18).and_hms_opt(17, 0, 0).unwrap(),
            })
            .unwrap();
        store.snapshot()
    }

    #[test]
    fn test_conflict_counts() {
        let facts = facts();
        let fleet = Fleet::with_size(5);
        let conflicts = ConflictDetector::default().detect(&fleet, &facts, now());

        assert_eq!(count(&conflicts, ConflictType::OpenJobCard), 2);
        assert_eq!(count(&conflicts, ConflictType::MissingCertificate), 4);
        assert_eq!(count(&conflicts, ConflictType::BrandingSlaBreach), 1);
        assert_eq!(count(&conflicts, ConflictType::CleaningNotScheduled), 0);

        let job = conflicts
            .iter()
            .find(|c| c.conflict_type == ConflictType::OpenJobCard && c.train_id.as_str() == "T003")
            .unwrap();
        assert_eq!(job.severity, Severity::High);
        assert_eq!(job.description, "Open job card JOB2002 blocking induction");
        assert_eq!(job.id, format!("conflict_{}", job.related_id.clone().unwrap()));

        let cert = conflicts
            .iter()
            .find(|c| c.id == "conflict_cert_T002")
            .unwrap();
        assert_eq!(cert.description, "Missing or expired fitness certificate for T002");
    }

    #[test]
    fn test_cleaning_gaps_when_enabled() {
        let facts = facts();
        let fleet = Fleet::with_size(3);
        let config = EngineConfig {
            detect_cleaning_gaps: true,
            ..EngineConfig::default()
        };
        let conflicts = ConflictDetector::new(&config).detect(&fleet, &facts, now());

        // T002 两天前清洗过
        assert_eq!(count(&conflicts, ConflictType::CleaningNotScheduled), 2);
        assert!(conflicts
            .iter()
            .filter(|c| c.conflict_type == ConflictType::CleaningNotScheduled)
            .all(|c| c.severity == Severity::Low && c.train_id.as_str() != "T002"));
    }

    #[test]
    fn test_empty_snapshot() {
        let fleet = Fleet::with_size(2);
        let conflicts = ConflictDetector::default().detect(&fleet, &FactSnapshot::default(), now());
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.conflict_type == ConflictType::MissingCertificate));
    }
}
