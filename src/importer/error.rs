// ==========================================
// 列车投运排班系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 规则: 任一行校验失败 → 整个文件拒绝（不做部分写入）
// ==========================================

use crate::domain::error::DomainError;
use std::fmt;
use thiserror::Error;

/// 单行校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 文件行号（表头为第 1 行）
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {} {}", self.row, self.field, self.message)
    }
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件为空")]
    EmptyFile,

    // ===== 数据映射错误 =====
    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("数据校验失败，共 {} 行错误: {}", .0.len(), summarize(.0))]
    RowErrors(Vec<RowError>),

    // ===== 写入错误 =====
    #[error("写入事实库失败: {0}")]
    ApplyError(#[from] DomainError),
}

fn summarize(errors: &[RowError]) -> String {
    errors
        .iter()
        .take(5)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ImportError {
    /// 行级错误列表（非行级错误返回空）
    pub fn row_errors(&self) -> &[RowError] {
        match self {
            ImportError::RowErrors(errors) => errors,
            _ => &[],
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
