// ==========================================
// 列车投运排班系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::induction_api::{system_clock, Clock};
use crate::api::InductionApi;
use crate::config::config_manager::ConfigManager;
use crate::config::engine_config::EngineConfig;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::scheduler::InductionScheduler;
use crate::repository::audit_repo::AuditLogRepository;
use crate::repository::fact_store::FactStore;

/// 应用状态
///
/// 共享同一个 SQLite 连接的配置管理器、审计仓储与排班 API
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub config_manager: Arc<ConfigManager>,

    pub audit_repo: Arc<AuditLogRepository>,

    /// 投运排班API
    pub induction_api: Arc<InductionApi>,
}

impl AppState {
    /// 按数据库中的配置初始化
    pub fn new(db_path: String, facts: FactStore) -> ApiResult<Self> {
        Self::build(db_path, facts, system_clock(), |config| config)
    }

    /// 初始化，并在库内配置基础上做调整（如命令行切换加权模式）
    pub fn build<F>(db_path: String, facts: FactStore, clock: Clock, adjust: F) -> ApiResult<Self>
    where
        F: FnOnce(EngineConfig) -> EngineConfig,
    {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("无法打开数据库: {}", e)))?;
        init_schema(&conn)
            .map_err(|e| ApiError::DatabaseError(format!("初始化表结构失败: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let config = adjust(config_manager.load_engine_config()?);
        config.validate()?;

        let audit_repo = Arc::new(AuditLogRepository::new(conn));
        let induction_api = Arc::new(InductionApi::new(
            InductionScheduler::new(config),
            facts,
            audit_repo.clone(),
        )
        .with_clock(clock));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            audit_repo,
            induction_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 TRAIN_INDUCTION_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("TRAIN_INDUCTION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./train_induction.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("train-induction");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("train_induction.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Operator;
    use crate::config::config_manager::config_keys;
    use crate::domain::types::UserRole;
    use crate::repository::audit_repo::AuditSink;
    use tempfile::NamedTempFile;

    #[test]
    fn test_app_state_uses_stored_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_string_lossy().to_string();

        let manager = ConfigManager::new(&db_path).unwrap();
        manager
            .set_global_config_value(config_keys::FLEET_SIZE, "4")
            .unwrap();
        drop(manager);

        let state = AppState::new(db_path, FactStore::new()).unwrap();
        assert_eq!(state.induction_api.config().unwrap().fleet_size, 4);

        let op = Operator::new("supervisor", UserRole::DepotSupervisor);
        let run = state.induction_api.run_scheduler(&op).unwrap();
        assert_eq!(run.plan.len(), 4);
        assert_eq!(state.audit_repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_build_adjusts_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_string_lossy().to_string();

        let state = AppState::build(db_path, FactStore::new(), system_clock(), |c| c.weighted()).unwrap();
        assert_eq!(
            state.induction_api.config().unwrap().mode,
            crate::domain::plan::ClassifierMode::Weighted
        );
    }
}
