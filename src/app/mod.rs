// ==========================================
// 列车投运排班系统 - 应用层
// ==========================================
// 职责: 组装数据库、配置、审计与排班 API，供 CLI 使用
// ==========================================

pub mod seed;
pub mod state;

// 重导出
pub use seed::demo_fact_store;
pub use state::{get_default_db_path, AppState};
