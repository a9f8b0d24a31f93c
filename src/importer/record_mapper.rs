// ==========================================
// 列车投运排班系统 - 导入行映射与校验
// ==========================================
// 作业单列: Train_ID, Job_Card_ID, Job_Category, Issue_Date, Target_Completion_Date
//           可选 Priority（缺省 Medium）、Due_Date（缺省 = Target_Completion_Date）
// 证书列:   Train_ID, Fit_ID, Dept, Valid_From, Valid_To
//           可选 Remarks
// 规则: 收集全部行错误后一次性返回，任一错误即整表拒绝
// ==========================================

use crate::domain::certificate::CertificateDraft;
use crate::domain::job_card::JobCardDraft;
use crate::domain::train::TrainId;
use crate::domain::types::{Department, JobCategory, JobPriority};
use crate::importer::error::{ImportError, ImportResult, RowError};
use crate::importer::file_parser::{RawRow, RawTable};
use chrono::NaiveDate;

pub const JOB_CARD_COLUMNS: [&str; 5] = [
    "Train_ID",
    "Job_Card_ID",
    "Job_Category",
    "Issue_Date",
    "Target_Completion_Date",
];

pub const CERTIFICATE_COLUMNS: [&str; 5] = ["Train_ID", "Fit_ID", "Dept", "Valid_From", "Valid_To"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 行级取值器，错误累积到 errors
struct RowReader<'a> {
    row: &'a RawRow,
    errors: &'a mut Vec<RowError>,
}

impl<'a> RowReader<'a> {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(RowError {
            row: self.row.line,
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str) -> Option<String> {
        match self.row.get(field) {
            Some(v) => Some(v.to_string()),
            None => {
                self.fail(field, "is required");
                None
            }
        }
    }

    fn train_id(&mut self) -> Option<TrainId> {
        let raw = self.row.get("Train_ID").unwrap_or("").to_string();
        match TrainId::parse(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail("Train_ID", format!("invalid format '{}' (expected T + 3 digits)", raw));
                None
            }
        }
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.required(field)?;
        let parsed = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&raw, fmt).ok());
        if parsed.is_none() {
            self.fail(field, format!("invalid date '{}' (expected YYYY-MM-DD)", raw));
        }
        parsed
    }

    fn optional_date(&mut self, field: &str) -> Option<Option<NaiveDate>> {
        if self.row.get(field).is_none() {
            return Some(None);
        }
        self.date(field).map(Some)
    }
}

fn finish<T>(drafts: Vec<T>, errors: Vec<RowError>) -> ImportResult<Vec<T>> {
    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(ImportError::RowErrors(errors))
    }
}

/// 映射作业单
pub fn map_job_cards(table: &RawTable, created_by: &str) -> ImportResult<Vec<JobCardDraft>> {
    table.require_columns(&JOB_CARD_COLUMNS)?;

    let mut drafts = Vec::with_capacity(table.rows.len());
    let mut errors = Vec::new();

    for row in &table.rows {
        let mut r = RowReader {
            row,
            errors: &mut errors,
        };

        let train_id = r.train_id();
        let code = r.required("Job_Card_ID");
        let category = r.required("Job_Category").and_then(|raw| {
            let parsed = JobCategory::from_str(&raw);
            if parsed.is_none() {
                r.fail("Job_Category", format!("unknown category '{}'", raw));
            }
            parsed
        });
        let priority = match row.get("Priority") {
            None => Some(JobPriority::Medium),
            Some(raw) => {
                let parsed = JobPriority::from_str(raw);
                if parsed.is_none() {
                    r.fail("Priority", format!("unknown priority '{}'", raw));
                }
                parsed
            }
        };
        let issue_date = r.date("Issue_Date");
        let target = r.date("Target_Completion_Date");
        let due = r.optional_date("Due_Date");

        if let (Some(train_id), Some(code), Some(category), Some(priority), Some(issue), Some(target), Some(due)) =
            (train_id, code, category, priority, issue_date, target, due)
        {
            let draft = JobCardDraft {
                train_id,
                job_card_code: code,
                category,
                priority,
                issue_date: issue,
                target_completion_date: target,
                due_date: due.unwrap_or(target),
                created_by: created_by.to_string(),
            };
            match draft.validate() {
                Ok(()) => drafts.push(draft),
                Err(e) => r.fail("row", e.to_string()),
            }
        }
    }

    finish(drafts, errors)
}

/// 映射适用证书
pub fn map_certificates(table: &RawTable, today: NaiveDate) -> ImportResult<Vec<CertificateDraft>> {
    table.require_columns(&CERTIFICATE_COLUMNS)?;

    let mut drafts = Vec::with_capacity(table.rows.len());
    let mut errors = Vec::new();

    for row in &table.rows {
        let mut r = RowReader {
            row,
            errors: &mut errors,
        };

        let train_id = r.train_id();
        let code = r.required("Fit_ID");
        let department = {
            let raw = row.get("Dept").unwrap_or("");
            let parsed = Department::from_str(raw);
            if parsed.is_none() {
                r.fail(
                    "Dept",
                    format!("invalid department '{}' (expected RollingStock, Signalling, or Telecom)", raw),
                );
            }
            parsed
        };
        let valid_from = r.date("Valid_From");
        let valid_to = r.date("Valid_To");

        if let (Some(train_id), Some(code), Some(department), Some(from), Some(to)) =
            (train_id, code, department, valid_from, valid_to)
        {
            let draft = CertificateDraft {
                certificate_code: code,
                train_id,
                department,
                valid_from: from,
                valid_to: to,
                remarks: row.get("Remarks").unwrap_or("").to_string(),
                created_date: today,
            };
            match draft.validate() {
                Ok(()) => drafts.push(draft),
                Err(e) => r.fail("row", e.to_string()),
            }
        }
    }

    finish(drafts, errors)
}
