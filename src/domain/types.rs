// ==========================================
// 列车投运排班系统 - 领域类型定义
// ==========================================
// 职责: 投运动作、风险等级、各类事实记录的枚举
// 序列化格式: 与导入/导出文件及前端展示保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 投运动作 (Induction Action)
// ==========================================
// 顺序: Service < Standby < IBL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InductionAction {
    Service, // 投入运营
    Standby, // 备用
    #[serde(rename = "IBL")]
    Ibl, // 检修库线
}

impl InductionAction {
    /// 排序优先级（越小越靠前）
    pub fn priority(&self) -> u8 {
        match self {
            InductionAction::Service => 1,
            InductionAction::Standby => 2,
            InductionAction::Ibl => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InductionAction::Service => "Service",
            InductionAction::Standby => "Standby",
            InductionAction::Ibl => "IBL",
        }
    }

    /// 从字符串解析（导入/CSV 回读）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Service" => Some(InductionAction::Service),
            "Standby" => Some(InductionAction::Standby),
            "IBL" => Some(InductionAction::Ibl),
            _ => None,
        }
    }
}

impl fmt::Display for InductionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 冲突严重度 (Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 冲突类型 (Conflict Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    MissingCertificate,   // 缺少有效适用证书
    OpenJobCard,          // 未关闭作业单
    CleaningNotScheduled, // 未安排清洗
    BrandingSlaBreach,    // 广告曝光 SLA 违约
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::MissingCertificate => write!(f, "missing_certificate"),
            ConflictType::OpenJobCard => write!(f, "open_job_card"),
            ConflictType::CleaningNotScheduled => write!(f, "cleaning_not_scheduled"),
            ConflictType::BrandingSlaBreach => write!(f, "branding_sla_breach"),
        }
    }
}

// ==========================================
// 作业单类别 (Job Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    Preventive,
    Brake,
    #[serde(rename = "HVAC")]
    Hvac,
    Electrical,
    Bogie,
    Cleaning,
    Software,
}

impl JobCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Preventive => "Preventive",
            JobCategory::Brake => "Brake",
            JobCategory::Hvac => "HVAC",
            JobCategory::Electrical => "Electrical",
            JobCategory::Bogie => "Bogie",
            JobCategory::Cleaning => "Cleaning",
            JobCategory::Software => "Software",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Preventive" => Some(JobCategory::Preventive),
            "Brake" => Some(JobCategory::Brake),
            "HVAC" => Some(JobCategory::Hvac),
            "Electrical" => Some(JobCategory::Electrical),
            "Bogie" => Some(JobCategory::Bogie),
            "Cleaning" => Some(JobCategory::Cleaning),
            "Software" => Some(JobCategory::Software),
            _ => None,
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 作业单优先级 (Job Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobPriority {
    Low,
    Medium,
    High,
}

impl JobPriority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Low" => Some(JobPriority::Low),
            "Medium" => Some(JobPriority::Medium),
            "High" => Some(JobPriority::High),
            _ => None,
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPriority::Low => write!(f, "Low"),
            JobPriority::Medium => write!(f, "Medium"),
            JobPriority::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 作业单状态 (Job Status)
// ==========================================
// 红线: 只允许 Open → Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Open,
    Closed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Open => write!(f, "Open"),
            JobStatus::Closed => write!(f, "Closed"),
        }
    }
}

// ==========================================
// 发证部门 (Department)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    RollingStock,
    Signalling,
    Telecom,
}

impl Department {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "RollingStock" => Some(Department::RollingStock),
            "Signalling" => Some(Department::Signalling),
            "Telecom" => Some(Department::Telecom),
            _ => None,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Department::RollingStock => write!(f, "RollingStock"),
            Department::Signalling => write!(f, "Signalling"),
            Department::Telecom => write!(f, "Telecom"),
        }
    }
}

// ==========================================
// 清洗类型 / 清洗股道
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleaningType {
    Regular,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleaningTrack {
    L1,
    L2,
    M1,
    M2,
}

impl CleaningTrack {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "L1" => Some(CleaningTrack::L1),
            "L2" => Some(CleaningTrack::L2),
            "M1" => Some(CleaningTrack::M1),
            "M2" => Some(CleaningTrack::M2),
            _ => None,
        }
    }
}

// ==========================================
// 停放股位状态 (Stabling Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StablingStatus {
    Empty,
    Occupied,
}

// ==========================================
// 广告窗口 SLA 状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlaStatus {
    Scheduled,  // 未开始
    InProgress, // 进行中
    Completed,  // 已达标
    Breached,   // 已违约
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaStatus::Scheduled => write!(f, "scheduled"),
            SlaStatus::InProgress => write!(f, "in-progress"),
            SlaStatus::Completed => write!(f, "completed"),
            SlaStatus::Breached => write!(f, "breached"),
        }
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    DepotSupervisor,
    FitnessCertManager,
    JobCardsManager,
    BrandingManager,
    CleaningDataManager,
    MileageManager,
    StablingGeometryManager,
    Admin,
}

impl UserRole {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::DepotSupervisor => "depot-supervisor",
            UserRole::FitnessCertManager => "fitness-cert-manager",
            UserRole::JobCardsManager => "job-cards-manager",
            UserRole::BrandingManager => "branding-manager",
            UserRole::CleaningDataManager => "cleaning-data-manager",
            UserRole::MileageManager => "mileage-manager",
            UserRole::StablingGeometryManager => "stabling-geometry-manager",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "depot-supervisor" => Some(UserRole::DepotSupervisor),
            "fitness-cert-manager" => Some(UserRole::FitnessCertManager),
            "job-cards-manager" => Some(UserRole::JobCardsManager),
            "branding-manager" => Some(UserRole::BrandingManager),
            "cleaning-data-manager" => Some(UserRole::CleaningDataManager),
            "mileage-manager" => Some(UserRole::MileageManager),
            "stabling-geometry-manager" => Some(UserRole::StablingGeometryManager),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_priority_order() {
        assert!(InductionAction::Service.priority() < InductionAction::Standby.priority());
        assert!(InductionAction::Standby.priority() < InductionAction::Ibl.priority());
    }

    #[test]
    fn test_action_serde_uses_display_names() {
        let json = serde_json::to_string(&InductionAction::Ibl).unwrap();
        assert_eq!(json, "\"IBL\"");
        assert_eq!(InductionAction::from_str("IBL"), Some(InductionAction::Ibl));
        assert_eq!(InductionAction::from_str("ibl"), None);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::DepotSupervisor, UserRole::StablingGeometryManager, UserRole::Admin] {
            assert_eq!(UserRole::from_str(role.to_db_str()), Some(role));
        }
    }

    #[test]
    fn test_conflict_type_serde() {
        let json = serde_json::to_string(&ConflictType::BrandingSlaBreach).unwrap();
        assert_eq!(json, "\"branding_sla_breach\"");
    }
}
