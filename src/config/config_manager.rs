// ==========================================
// 列车投运排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 缺省项取 EngineConfig::default()；格式错误告警后回退默认值；
//       越界值直接报错
// ==========================================

use crate::config::engine_config::{ConfigError, ConfigResult, CostModel, EngineConfig, SchedulerWeights};
use crate::db::open_sqlite_connection;
use crate::domain::plan::ClassifierMode;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidFormat {
            key: "snapshot".to_string(),
            value: err.to_string(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::Storage(format!("锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::Storage(format!("锁获取失败: {}", e)))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        tracing::debug!(config_key = key, value, "写入配置");
        Ok(())
    }

    /// 读取数值配置，格式错误时告警并回退默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        config_key = key,
                        raw_value = %raw,
                        default = %default,
                        "配置格式错误，使用默认值"
                    );
                    Ok(default)
                }
            },
        }
    }

    // ==========================================
    // 引擎配置
    // ==========================================

    /// 加载引擎配置（默认值 + 覆写）
    pub fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        let d = EngineConfig::default();

        let weights = SchedulerWeights {
            mileage: self.get_parsed_or(config_keys::WEIGHT_MILEAGE, d.weights.mileage)?,
            job_cards: self.get_parsed_or(config_keys::WEIGHT_JOB_CARDS, d.weights.job_cards)?,
            branding: self.get_parsed_or(config_keys::WEIGHT_BRANDING, d.weights.branding)?,
            cleaning: self.get_parsed_or(config_keys::WEIGHT_CLEANING, d.weights.cleaning)?,
        };

        let mut config = d.clone();
        config.weights = weights;
        config.thresholds.medium_risk =
            self.get_parsed_or(config_keys::THRESHOLD_MEDIUM_RISK, d.thresholds.medium_risk)?;
        config.thresholds.high_risk =
            self.get_parsed_or(config_keys::THRESHOLD_HIGH_RISK, d.thresholds.high_risk)?;
        config.thresholds.standby =
            self.get_parsed_or(config_keys::THRESHOLD_STANDBY, d.thresholds.standby)?;
        config.thresholds.reason =
            self.get_parsed_or(config_keys::THRESHOLD_REASON, d.thresholds.reason)?;
        config.fleet_size = self.get_parsed_or(config_keys::FLEET_SIZE, d.fleet_size)?;
        config.maintenance_km_limit =
            self.get_parsed_or(config_keys::MAINTENANCE_KM_LIMIT, d.maintenance_km_limit)?;
        config.high_mileage_km =
            self.get_parsed_or(config_keys::HIGH_MILEAGE_KM, d.high_mileage_km)?;
        config.cleaning_staleness_days =
            self.get_parsed_or(config_keys::CLEANING_STALENESS_DAYS, d.cleaning_staleness_days)?;
        config.cert_warning_days =
            self.get_parsed_or(config_keys::CERT_WARNING_DAYS, d.cert_warning_days)?;
        config.detect_cleaning_gaps =
            self.get_parsed_or(config_keys::DETECT_CLEANING_GAPS, d.detect_cleaning_gaps)?;

        if let Some(raw) = self.get_global_config_value(config_keys::CLASSIFIER_MODE)? {
            config.mode = ClassifierMode::from_str(&raw).unwrap_or_else(|| {
                tracing::warn!(config_key = config_keys::CLASSIFIER_MODE, raw_value = %raw, "未知分类模式，使用默认值");
                d.mode
            });
        }
        if let Some(raw) = self.get_global_config_value(config_keys::COST_MODEL)? {
            config.cost_model = CostModel::from_str(&raw).unwrap_or_else(|| {
                tracing::warn!(config_key = config_keys::COST_MODEL, raw_value = %raw, "未知成本模型，使用默认值");
                d.cost_model
            });
        }
        if let Some(raw) = self.get_global_config_value(config_keys::COST_SEED)? {
            config.cost_seed = raw.trim().parse::<u64>().ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// 保存权重（先校验）
    pub fn save_weights(&self, weights: &SchedulerWeights) -> ConfigResult<()> {
        weights.validate()?;
        self.set_global_config_value(config_keys::WEIGHT_MILEAGE, &weights.mileage.to_string())?;
        self.set_global_config_value(config_keys::WEIGHT_JOB_CARDS, &weights.job_cards.to_string())?;
        self.set_global_config_value(config_keys::WEIGHT_BRANDING, &weights.branding.to_string())?;
        self.set_global_config_value(config_keys::WEIGHT_CLEANING, &weights.cleaning.to_string())?;
        Ok(())
    }

    pub fn save_mode(&self, mode: ClassifierMode) -> ConfigResult<()> {
        self.set_global_config_value(config_keys::CLASSIFIER_MODE, &mode.to_string())
    }

    // ==========================================
    // 快照 / 恢复
    // ==========================================

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的global配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            if key.starts_with("__meta_") {
                continue;
            }
            let affected = tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 权重
    pub const WEIGHT_MILEAGE: &str = "weight_mileage";
    pub const WEIGHT_JOB_CARDS: &str = "weight_job_cards";
    pub const WEIGHT_BRANDING: &str = "weight_branding";
    pub const WEIGHT_CLEANING: &str = "weight_cleaning";

    // 阈值
    pub const THRESHOLD_MEDIUM_RISK: &str = "threshold_medium_risk";
    pub const THRESHOLD_HIGH_RISK: &str = "threshold_high_risk";
    pub const THRESHOLD_STANDBY: &str = "threshold_standby";
    pub const THRESHOLD_REASON: &str = "threshold_reason";

    // 模式
    pub const CLASSIFIER_MODE: &str = "classifier_mode";
    pub const COST_MODEL: &str = "cost_model";
    pub const COST_SEED: &str = "cost_seed";

    // 车队与信号标定
    pub const FLEET_SIZE: &str = "fleet_size";
    pub const MAINTENANCE_KM_LIMIT: &str = "maintenance_km_limit";
    pub const HIGH_MILEAGE_KM: &str = "high_mileage_km";
    pub const CLEANING_STALENESS_DAYS: &str = "cleaning_staleness_days";
    pub const CERT_WARNING_DAYS: &str = "cert_warning_days";
    pub const DETECT_CLEANING_GAPS: &str = "detect_cleaning_gaps";
}
