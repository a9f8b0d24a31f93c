// ==========================================
// 列车投运排班系统 - 演示数据
// ==========================================
// 用途: CLI 演示 / 端到端测试的默认车队事实
// 内容:
// - 作业单: T001 预防性维护（High）、T003 制动（Medium），均为 Open
// - 证书: T001 RollingStock 全年有效
// - 里程: T001 / T002
// - 广告: T005（now+2d 起 24 小时窗口）
// - 清洗: T002 常规 / T004 深度
// - 股位: T001 / T003 / T005 / T007 / T009
// ==========================================

use crate::domain::branding::BrandingDraft;
use crate::domain::certificate::CertificateDraft;
use crate::domain::cleaning::CleaningDraft;
use crate::domain::error::DomainResult;
use crate::domain::job_card::JobCardDraft;
use crate::domain::mileage::MileageDraft;
use crate::domain::stabling::{SlotPosition, StablingDraft, StablingTrack};
use crate::domain::train::TrainId;
use crate::domain::types::{
    CleaningTrack, CleaningType, Department, JobCategory, JobPriority, StablingStatus,
};
use crate::repository::fact_store::FactStore;
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // 常量日期均合法
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// 构造演示事实库
pub fn demo_fact_store(now: NaiveDateTime) -> DomainResult<FactStore> {
    let mut store = FactStore::new();

    // ===== 作业单 =====
    for (train, code, category, priority, issue, target, due) in [
        ("T001", "JOB2001", JobCategory::Preventive, JobPriority::High, ymd(2025, 1, 10), ymd(2025, 1, 20), ymd(2025, 1, 17)),
        ("T003", "JOB2002", JobCategory::Brake, JobPriority::Medium, ymd(2025, 1, 12), ymd(2025, 1, 22), ymd(2025, 1, 19)),
    ] {
        store.add_job_card(JobCardDraft {
            train_id: TrainId::new(train),
            job_card_code: code.to_string(),
            category,
            priority,
            issue_date: issue,
            target_completion_date: target,
            due_date: due,
            created_by: "user1".to_string(),
        })?;
    }

    // ===== 证书 =====
    store.add_certificate(CertificateDraft {
        certificate_code: "FIT001".to_string(),
        train_id: TrainId::new("T001"),
        department: Department::RollingStock,
        valid_from: ymd(2025, 1, 1),
        valid_to: ymd(2025, 12, 31),
        remarks: "All systems operational".to_string(),
        created_date: ymd(2025, 1, 1),
    })?;

    // ===== 里程 =====
    for (train, daily_km, km_since) in [("T001", 180.0, 2500.0), ("T002", 165.0, 1200.0)] {
        store.upsert_mileage(MileageDraft {
            train_id: TrainId::new(train),
            daily_km,
            km_since_maintenance: km_since,
            reading_date: ymd(2025, 1, 15),
        })?;
    }

    // ===== 广告窗口 =====
    store.add_branding_window(BrandingDraft {
        brand_name: "Metro Express".to_string(),
        train_id: TrainId::new("T005"),
        start: now + Duration::days(2),
        end: now + Duration::days(3),
        required_hours: 8.0,
        exposure_hours_completed: 6.0,
    })?;

    // ===== 清洗 =====
    store.add_cleaning(CleaningDraft {
        train_id: TrainId::new("T002"),
        cleaning_type: CleaningType::Regular,
        track: CleaningTrack::L1,
        issue_date: ymd(2025, 1, 14),
        completion_date: ymd(2025, 1, 15),
        submitted_at: now,
    })?;
    store.add_cleaning(CleaningDraft {
        train_id: TrainId::new("T004"),
        cleaning_type: CleaningType::Deep,
        track: CleaningTrack::M1,
        issue_date: ymd(2025, 1, 13),
        completion_date: ymd(2025, 1, 14),
        submitted_at: now - Duration::days(1),
    })?;

    // ===== 股位 =====
    for (train, track, slot, status, days_ago) in [
        ("T001", "S1", 1, StablingStatus::Occupied, 2),
        ("T003", "S2", 1, StablingStatus::Occupied, 1),
        ("T005", "L1", 2, StablingStatus::Occupied, 0),
        ("T007", "S3", 1, StablingStatus::Empty, 3),
        ("T009", "L2", 2, StablingStatus::Occupied, 4),
    ] {
        store.add_stabling(StablingDraft {
            train_id: TrainId::new(train),
            track: StablingTrack::parse(track)?,
            slot: SlotPosition::from_number(slot)?,
            status,
            submitted_at: now - Duration::days(days_ago),
        })?;
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fact_store::FactSource;

    #[test]
    fn test_demo_seed_contents() {
        let now = ymd(2025, 1, 20).and_hms_opt(9, 0, 0).unwrap();
        let store = demo_fact_store(now).unwrap();
        let facts = store.snapshot();

        assert_eq!(facts.job_cards.len(), 2);
        assert_eq!(facts.certificates.len(), 1);
        assert_eq!(facts.mileage.len(), 2);
        assert_eq!(facts.branding_windows.len(), 1);
        assert_eq!(facts.cleaning.len(), 2);
        assert_eq!(facts.stabling.len(), 5);
        assert_eq!(store.next_job_card_code(), "JOB2003");
    }
}
