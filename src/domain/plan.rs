// ==========================================
// 列车投运排班系统 - 投运计划领域模型
// ==========================================
// 派生对象: 每次排班整体重算，不做局部更新，不持久化
// 红线: rank 从 1 开始连续、唯一
// ==========================================

use crate::domain::train::TrainId;
use crate::domain::types::{InductionAction, RiskLevel};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ClassifierMode - 分类模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// 规则优先级（首条命中即返回）
    #[default]
    RulePriority,
    /// 加权评分（作业单/证书阻断保持不可覆盖）
    Weighted,
}

impl ClassifierMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "rule_priority" => Some(ClassifierMode::RulePriority),
            "weighted" => Some(ClassifierMode::Weighted),
            _ => None,
        }
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierMode::RulePriority => write!(f, "rule_priority"),
            ClassifierMode::Weighted => write!(f, "weighted"),
        }
    }
}

// ==========================================
// Classification - 单车分类结果（排序前）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub train_id: TrainId,
    pub action: InductionAction,
    pub reasons: Vec<String>,
    pub risk: RiskLevel,
    /// 加权模式下的综合风险分 [0,1]
    pub score: Option<f64>,
    pub shunt_cost: u32,
}

// ==========================================
// InductionPlanEntry - 计划条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionPlanEntry {
    pub rank: u32,
    pub train_id: TrainId,
    pub recommended_action: InductionAction,
    pub reasons: Vec<String>,
    pub shunt_cost: u32,
    pub predicted_risk: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

// ==========================================
// InductionPlan - 投运计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionPlan {
    pub plan_id: String,
    pub generated_at: NaiveDateTime,
    pub mode: ClassifierMode,
    pub entries: Vec<InductionPlanEntry>,
}

impl InductionPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_for(&self, train_id: &TrainId) -> Option<&InductionPlanEntry> {
        self.entries.iter().find(|e| &e.train_id == train_id)
    }

    pub fn count_action(&self, action: InductionAction) -> usize {
        self.entries
            .iter()
            .filter(|e| e.recommended_action == action)
            .count()
    }
}
