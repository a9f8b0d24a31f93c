// ==========================================
// 列车投运排班系统 - 导入层
// ==========================================
// 职责: 外部文件 → 原始表 → 校验后的事实草稿
// 支持: Excel, CSV
// 规则: 任一行错误整表拒绝，由服务层一次性写入
// ==========================================

pub mod error;
pub mod file_parser;
pub mod record_mapper;

// 重导出核心类型
pub use error::{ImportError, ImportResult, RowError};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, RawTable, UniversalFileParser};
pub use record_mapper::{map_certificates, map_job_cards, CERTIFICATE_COLUMNS, JOB_CARD_COLUMNS};
