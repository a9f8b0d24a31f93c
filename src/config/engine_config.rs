// ==========================================
// 列车投运排班系统 - 引擎配置
// ==========================================
// 职责: 权重、阈值、车队规模、分类模式、调车成本模型
// 来源: 默认值 + config_kv 覆写（见 ConfigManager）
// 红线: 权重必须在 [0,1]；阈值必须在 [0,1]
// ==========================================

use crate::domain::plan::ClassifierMode;
use crate::domain::train::DEFAULT_FLEET_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("配置项超出范围 (key={key}): {value}, 期望 {expected}")]
    OutOfRange {
        key: String,
        value: String,
        expected: String,
    },

    #[error("配置项格式错误 (key={key}): {value}")]
    InvalidFormat { key: String, value: String },

    #[error("配置存储失败: {0}")]
    Storage(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn check_unit_interval(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            expected: "[0, 1]".to_string(),
        })
    }
}

fn check_positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            expected: "> 0".to_string(),
        })
    }
}

// ==========================================
// SchedulerWeights - 加权评分权重
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerWeights {
    pub mileage: f64,
    pub job_cards: f64,
    pub branding: f64,
    pub cleaning: f64,
}

impl Default for SchedulerWeights {
    fn default() -> Self {
        Self {
            mileage: 0.3,
            job_cards: 0.4,
            branding: 0.2,
            cleaning: 0.1,
        }
    }
}

impl SchedulerWeights {
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit_interval("weight_mileage", self.mileage)?;
        check_unit_interval("weight_job_cards", self.job_cards)?;
        check_unit_interval("weight_branding", self.branding)?;
        check_unit_interval("weight_cleaning", self.cleaning)?;
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.mileage + self.job_cards + self.branding + self.cleaning
    }
}

// ==========================================
// ScoreThresholds - 加权模式阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    /// 达到即 Medium
    pub medium_risk: f64,
    /// 达到即 High
    pub high_risk: f64,
    /// 达到即建议 Standby
    pub standby: f64,
    /// 单项信号达到即写入原因
    pub reason: f64,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            medium_risk: 0.4,
            high_risk: 0.7,
            standby: 0.6,
            reason: 0.5,
        }
    }
}

impl ScoreThresholds {
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit_interval("threshold_medium_risk", self.medium_risk)?;
        check_unit_interval("threshold_high_risk", self.high_risk)?;
        check_unit_interval("threshold_standby", self.standby)?;
        check_unit_interval("threshold_reason", self.reason)?;
        if self.medium_risk > self.high_risk {
            return Err(ConfigError::OutOfRange {
                key: "threshold_medium_risk".to_string(),
                value: self.medium_risk.to_string(),
                expected: format!("<= threshold_high_risk ({})", self.high_risk),
            });
        }
        Ok(())
    }
}

// ==========================================
// CostModel - 调车成本模型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// 随机占位 [100, 599]
    #[default]
    Random,
    /// 按停放股位推算
    Stabling,
}

impl CostModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "random" => Some(CostModel::Random),
            "stabling" => Some(CostModel::Stabling),
            _ => None,
        }
    }
}

impl fmt::Display for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostModel::Random => write!(f, "random"),
            CostModel::Stabling => write!(f, "stabling"),
        }
    }
}

// ==========================================
// EngineConfig - 引擎配置全集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: SchedulerWeights,
    pub thresholds: ScoreThresholds,
    pub mode: ClassifierMode,
    pub cost_model: CostModel,
    /// 随机成本种子（None 表示取系统熵）
    pub cost_seed: Option<u64>,
    pub fleet_size: u32,
    /// 里程信号满分对应的保养间隔公里数
    pub maintenance_km_limit: f64,
    /// 里程统计中 "临近保养" 的公里数
    pub high_mileage_km: f64,
    /// 清洗信号满分对应的天数
    pub cleaning_staleness_days: i64,
    /// 证书临期预警天数
    pub cert_warning_days: i64,
    /// 是否输出 cleaning_not_scheduled 冲突
    pub detect_cleaning_gaps: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: SchedulerWeights::default(),
            thresholds: ScoreThresholds::default(),
            mode: ClassifierMode::RulePriority,
            cost_model: CostModel::Random,
            cost_seed: None,
            fleet_size: DEFAULT_FLEET_SIZE,
            maintenance_km_limit: 5000.0,
            high_mileage_km: 4000.0,
            cleaning_staleness_days: 7,
            cert_warning_days: 30,
            detect_cleaning_gaps: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        check_positive("maintenance_km_limit", self.maintenance_km_limit)?;
        check_positive("high_mileage_km", self.high_mileage_km)?;
        check_positive("cleaning_staleness_days", self.cleaning_staleness_days as f64)?;
        check_positive("cert_warning_days", self.cert_warning_days as f64)?;
        Ok(())
    }

    pub fn weighted(mut self) -> Self {
        self.mode = ClassifierMode::Weighted;
        self
    }

    pub fn with_weights(mut self, weights: SchedulerWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_cost_model(mut self, cost_model: CostModel, seed: Option<u64>) -> Self {
        self.cost_model = cost_model;
        self.cost_seed = seed;
        self
    }
}
