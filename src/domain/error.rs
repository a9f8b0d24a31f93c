// ==========================================
// 列车投运排班系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 用途: 事实录入时的实体校验（提交方处理，不影响引擎）
// ==========================================

use thiserror::Error;

/// 领域实体校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("车号格式错误: {0}（应为 T + 3 位数字，如 T001）")]
    InvalidTrainId(String),

    #[error("必填字段缺失: {0}")]
    MissingField(String),

    #[error("字段取值无效 (field={field}): {value}")]
    InvalidValue { field: String, value: String },

    #[error("日期区间无效 (field={field}): {start} > {end}")]
    InvalidDateRange {
        field: String,
        start: String,
        end: String,
    },

    #[error("股道名称无效: {0}（停放 S1-S20 / 正线 L1-L6）")]
    InvalidTrack(String),

    #[error("股位无效: {0}（每条股道只有 1、2 两个股位）")]
    InvalidSlot(u8),

    #[error("数值不能为负 (field={field}): {value}")]
    NegativeValue { field: String, value: f64 },

    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
