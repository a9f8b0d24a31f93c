// ==========================================
// 列车投运排班系统 - CSV 导出
// ==========================================
// 计划: Rank,Train_ID,Recommended_Action,Reasons,Shunt_Cost,Predicted_Risk
//       reasons 以 "; " 拼接；含逗号/引号的字段由 csv 自动加引号并双写内部引号
// 审计: Timestamp,User,Role,Action,Reason,Train_ID
// ==========================================

use crate::domain::audit::AuditEntry;
use crate::domain::plan::InductionPlan;
use crate::domain::train::TrainId;
use crate::domain::types::{InductionAction, RiskLevel};
use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

pub const PLAN_HEADER: [&str; 6] = [
    "Rank",
    "Train_ID",
    "Recommended_Action",
    "Reasons",
    "Shunt_Cost",
    "Predicted_Risk",
];

pub const AUDIT_HEADER: [&str; 6] = ["Timestamp", "User", "Role", "Action", "Reason", "Train_ID"];

const REASON_SEPARATOR: &str = "; ";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 读写失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("输出编码错误: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("第 {line} 行格式错误: {message}")]
    InvalidRecord { line: u64, message: String },
}

pub type ExportResult<T> = Result<T, ExportError>;

/// 计划 CSV 解析结果（单行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPlanRow {
    pub rank: u32,
    pub train_id: TrainId,
    pub action: InductionAction,
    pub reasons: Vec<String>,
    pub shunt_cost: u32,
    pub predicted_risk: RiskLevel,
}

// ==========================================
// 计划导出
// ==========================================

pub fn write_plan_csv<W: Write>(plan: &InductionPlan, writer: W) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(PLAN_HEADER)?;

    for entry in &plan.entries {
        wtr.write_record([
            entry.rank.to_string(),
            entry.train_id.to_string(),
            entry.recommended_action.to_string(),
            entry.reasons.join(REASON_SEPARATOR),
            entry.shunt_cost.to_string(),
            entry.predicted_risk.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn plan_to_csv_string(plan: &InductionPlan) -> ExportResult<String> {
    let mut buf = Vec::new();
    write_plan_csv(plan, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn export_plan_to_file<P: AsRef<Path>>(plan: &InductionPlan, path: P) -> ExportResult<()> {
    let file = File::create(path.as_ref())?;
    write_plan_csv(plan, file)?;
    tracing::info!(
        path = %path.as_ref().display(),
        rows = plan.len(),
        "投运计划已导出"
    );
    Ok(())
}

/// 解析计划 CSV
pub fn parse_plan_csv<R: Read>(reader: R) -> ExportResult<Vec<ExportedPlanRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let invalid = |column: &str, value: &str| ExportError::InvalidRecord {
            line,
            message: format!("{} = '{}'", column, value),
        };

        let rank = field(0)
            .parse::<u32>()
            .map_err(|_| invalid("Rank", field(0)))?;
        let action = InductionAction::from_str(field(2))
            .ok_or_else(|| invalid("Recommended_Action", field(2)))?;
        let shunt_cost = field(4)
            .parse::<u32>()
            .map_err(|_| invalid("Shunt_Cost", field(4)))?;
        let predicted_risk =
            RiskLevel::from_str(field(5)).ok_or_else(|| invalid("Predicted_Risk", field(5)))?;
        let reasons = if field(3).is_empty() {
            Vec::new()
        } else {
            field(3)
                .split(REASON_SEPARATOR)
                .map(|s| s.to_string())
                .collect()
        };

        rows.push(ExportedPlanRow {
            rank,
            train_id: TrainId::new(field(1)),
            action,
            reasons,
            shunt_cost,
            predicted_risk,
        });
    }

    Ok(rows)
}

// ==========================================
// 审计报表导出
// ==========================================

pub fn write_audit_csv<W: Write>(entries: &[AuditEntry], writer: W) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(AUDIT_HEADER)?;

    for entry in entries {
        wtr.write_record([
            entry.timestamp_iso(),
            entry.user.clone(),
            entry.role.to_string(),
            entry.action.clone(),
            entry.reason.clone(),
            entry
                .train_id
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn audit_to_csv_string(entries: &[AuditEntry]) -> ExportResult<String> {
    let mut buf = Vec::new();
    write_audit_csv(entries, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{ClassifierMode, InductionPlanEntry};
    use crate::domain::types::UserRole;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn plan() -> InductionPlan {
        InductionPlan {
            plan_id: "plan_test".to_string(),
            generated_at: NaiveDate::from_ymd_opt(2025, 1, 20)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            mode: ClassifierMode::RulePriority,
            entries: vec![
                InductionPlanEntry {
                    rank: 1,
                    train_id: TrainId::new("T002"),
                    recommended_action: InductionAction::Service,
                    reasons: vec!["All checks passed".to_string()],
                    shunt_cost: 120,
                    predicted_risk: RiskLevel::Low,
                    score: None,
                },
                InductionPlanEntry {
                    rank: 2,
                    train_id: TrainId::new("T001"),
                    recommended_action: InductionAction::Ibl,
                    reasons: vec![
                        "Open job card blocking induction".to_string(),
                        "Cleaning overdue, \"deep\" pending".to_string(),
                    ],
                    shunt_cost: 480,
                    predicted_risk: RiskLevel::High,
                    score: Some(0.8),
                },
            ],
        }
    }

    #[test]
    fn test_plan_csv_layout() {
        let text = plan_to_csv_string(&plan()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Rank,Train_ID,Recommended_Action,Reasons,Shunt_Cost,Predicted_Risk")
        );
        assert_eq!(lines.next(), Some("1,T002,Service,All checks passed,120,Low"));
        assert_eq!(
            lines.next(),
            Some("2,T001,IBL,\"Open job card blocking induction; Cleaning overdue, \"\"deep\"\" pending\",480,High")
        );
    }

    #[test]
    fn test_plan_csv_parse_recovers_entries() {
        let text = plan_to_csv_string(&plan()).unwrap();
        let rows = parse_plan_csv(text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].train_id, TrainId::new("T001"));
        assert_eq!(rows[1].action, InductionAction::Ibl);
        assert_eq!(rows[1].shunt_cost, 480);
        assert_eq!(rows[1].reasons, plan().entries[1].reasons);
    }

    #[test]
    fn test_parse_rejects_bad_rank() {
        let text = "Rank,Train_ID,Recommended_Action,Reasons,Shunt_Cost,Predicted_Risk\n\
                    x,T001,Service,ok,100,Low\n";
        let err = parse_plan_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRecord { line: 2, .. }));
    }

    #[test]
    fn test_audit_csv() {
        let entry = AuditEntry::new("supervisor", UserRole::DepotSupervisor, "Manual Override", "Brake test")
            .with_train(TrainId::new("T004"))
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 20, 8, 30, 0).unwrap());
        let text = audit_to_csv_string(&[entry]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Timestamp,User,Role,Action,Reason,Train_ID");
        assert!(lines[1].starts_with("2025-01-20T08:30:00.000Z,supervisor,"));
        assert!(lines[1].ends_with(",Manual Override,Brake test,T004"));
    }
}
