// ==========================================
// 列车投运排班系统 - 看板统计
// ==========================================
// 职责: 计划与事实的汇总指标（只读）
// - 车队: 各动作数量、可用率 = round((Service + Standby) / 总数 × 100)
// - 广告: 窗口数、预警数、违约数、累计曝光小时
// - 证书: 总数、有效、过期、临期
// - 作业单 / 里程 / 清洗 / 股位: 计数类指标
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::plan::InductionPlan;
use crate::domain::types::{CleaningType, InductionAction, SlaStatus, StablingStatus};
use crate::repository::fact_store::FactSnapshot;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total: usize,
    pub service: usize,
    pub standby: usize,
    pub ibl: usize,
    /// 百分比（四舍五入）
    pub availability_pct: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrandingStats {
    pub total: usize,
    pub in_progress: usize,
    pub at_risk: usize,
    pub breached: usize,
    pub completed: usize,
    /// 各窗口已曝光小时数之和（进行中按已过小时计）
    pub total_exposure_hours: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
    pub expiring_soon: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCardStats {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MileageStats {
    pub trains_reporting: usize,
    pub average_daily_km: u32,
    pub nearing_maintenance: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub total: usize,
    pub regular: usize,
    pub deep: usize,
    pub submitted_today: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StablingStats {
    pub records: usize,
    pub occupied_slots: usize,
    pub empty_slots: usize,
    pub submitted_today: usize,
}

pub fn fleet_summary(plan: &InductionPlan) -> FleetSummary {
    let total = plan.len();
    let service = plan.count_action(InductionAction::Service);
    let standby = plan.count_action(InductionAction::Standby);
    let ibl = plan.count_action(InductionAction::Ibl);
    let availability_pct = if total == 0 {
        0
    } else {
        (((service + standby) as f64 / total as f64) * 100.0).round() as u32
    };

    FleetSummary {
        total,
        service,
        standby,
        ibl,
        availability_pct,
    }
}

pub fn branding_stats(facts: &FactSnapshot, now: NaiveDateTime) -> BrandingStats {
    let mut stats = BrandingStats {
        total: facts.branding_windows.len(),
        in_progress: 0,
        at_risk: 0,
        breached: 0,
        completed: 0,
        total_exposure_hours: 0,
    };

    for window in &facts.branding_windows {
        let sla = window.sla(now);
        stats.total_exposure_hours += sla.elapsed_hours;
        match sla.status {
            SlaStatus::InProgress => stats.in_progress += 1,
            SlaStatus::Breached => stats.breached += 1,
            SlaStatus::Completed => stats.completed += 1,
            SlaStatus::Scheduled => {}
        }
        if window.is_at_risk(now) {
            stats.at_risk += 1;
        }
    }
    stats
}

pub fn fitness_stats(facts: &FactSnapshot, now: NaiveDateTime, config: &EngineConfig) -> FitnessStats {
    let today = now.date();
    let certs = &facts.certificates;

    FitnessStats {
        total: certs.len(),
        valid: certs.iter().filter(|c| c.is_valid_on(today)).count(),
        expired: certs.iter().filter(|c| c.is_expired(today)).count(),
        expiring_soon: certs
            .iter()
            .filter(|c| c.is_valid_on(today) && c.days_until_expiry(today) <= config.cert_warning_days)
            .count(),
    }
}

pub fn job_card_stats(facts: &FactSnapshot, now: NaiveDateTime) -> JobCardStats {
    let today = now.date();
    let open = facts.open_job_cards().count();

    JobCardStats {
        total: facts.job_cards.len(),
        open,
        closed: facts.job_cards.len() - open,
        overdue: facts.job_cards.iter().filter(|jc| jc.is_overdue(today)).count(),
    }
}

pub fn mileage_stats(facts: &FactSnapshot, config: &EngineConfig) -> MileageStats {
    let n = facts.mileage.len();
    let average_daily_km = if n == 0 {
        0
    } else {
        (facts.mileage.iter().map(|m| m.daily_km).sum::<f64>() / n as f64).round() as u32
    };

    MileageStats {
        trains_reporting: n,
        average_daily_km,
        nearing_maintenance: facts
            .mileage
            .iter()
            .filter(|m| m.km_since_maintenance > config.high_mileage_km)
            .count(),
    }
}

pub fn cleaning_stats(facts: &FactSnapshot, now: NaiveDateTime) -> CleaningStats {
    let today = now.date();
    CleaningStats {
        total: facts.cleaning.len(),
        regular: facts
            .cleaning
            .iter()
            .filter(|c| c.cleaning_type == CleaningType::Regular)
            .count(),
        deep: facts
            .cleaning
            .iter()
            .filter(|c| c.cleaning_type == CleaningType::Deep)
            .count(),
        submitted_today: facts
            .cleaning
            .iter()
            .filter(|c| c.submission_date() == today)
            .count(),
    }
}

/// 股位统计（占用/空闲取当前视图）
pub fn stabling_stats(facts: &FactSnapshot, now: NaiveDateTime) -> StablingStats {
    let today = now.date();
    let occupancy = facts.current_occupancy();
    let occupied_slots = occupancy
        .values()
        .filter(|g| g.status == StablingStatus::Occupied)
        .count();

    StablingStats {
        records: facts.stabling.len(),
        occupied_slots,
        empty_slots: occupancy.len() - occupied_slots,
        submitted_today: facts
            .stabling
            .iter()
            .filter(|g| g.submitted_at.date() == today)
            .count(),
    }
}
