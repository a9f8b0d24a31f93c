// ==========================================
// 列车投运排班系统 - 投运分类引擎
// ==========================================
// 职责: 单车 → (动作, 原因, 风险, 评分)
// 规则优先级（首条命中即返回）:
// 1. 存在 Open 作业单   → IBL / High
// 2. 无有效适用证书     → Standby / Medium
// 3. 其余               → Service / Low
// 加权模式: 规则 1/2 仍为硬阻断；通过阻断的列车按综合分判定
// 红线: 所有结论必须输出 reason，reasons 不可为空
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::plan::{Classification, ClassifierMode};
use crate::domain::train::TrainId;
use crate::domain::types::{InductionAction, RiskLevel};
use crate::engine::signals::{ScoreBreakdown, SignalContext, WeightedScorer};
use crate::repository::fact_store::FactSnapshot;
use chrono::NaiveDateTime;

pub const REASON_OPEN_JOB_CARD: &str = "Open job card blocking induction";
pub const REASON_MISSING_CERTIFICATE: &str = "Missing valid fitness certificate";
pub const REASON_ALL_CLEAR: &str = "All checks passed";

// ==========================================
// InductionClassifier
// ==========================================
pub struct InductionClassifier {
    config: EngineConfig,
    scorer: WeightedScorer,
}

impl InductionClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            scorer: WeightedScorer::from_weights(&config.weights),
        }
    }

    /// 默认规则优先级模式
    pub fn rule_priority() -> Self {
        Self::new(&EngineConfig::default())
    }

    pub fn mode(&self) -> ClassifierMode {
        self.config.mode
    }

    /// 分类单车
    ///
    /// shunt_cost 由成本估算器随后填写
    pub fn classify(
        &self,
        train_id: &TrainId,
        facts: &FactSnapshot,
        now: NaiveDateTime,
    ) -> Classification {
        match self.config.mode {
            ClassifierMode::RulePriority => self.classify_by_rules(train_id, facts, now),
            ClassifierMode::Weighted => self.classify_weighted(train_id, facts, now),
        }
    }

    /// 硬阻断（两种模式共用）
    fn blocking_verdict(
        &self,
        train_id: &TrainId,
        facts: &FactSnapshot,
        now: NaiveDateTime,
    ) -> Option<(InductionAction, &'static str, RiskLevel)> {
        if facts.has_open_job_card(train_id) {
            return Some((InductionAction::Ibl, REASON_OPEN_JOB_CARD, RiskLevel::High));
        }
        if !facts.has_valid_certificate(train_id, now.date()) {
            return Some((
                InductionAction::Standby,
                REASON_MISSING_CERTIFICATE,
                RiskLevel::Medium,
            ));
        }
        None
    }

    fn classify_by_rules(
        &self,
        train_id: &TrainId,
        facts: &FactSnapshot,
        now: NaiveDateTime,
    ) -> Classification {
        let (action, reason, risk) = self
            .blocking_verdict(train_id, facts, now)
            .unwrap_or((InductionAction::Service, REASON_ALL_CLEAR, RiskLevel::Low));

        Classification {
            train_id: train_id.clone(),
            action,
            reasons: vec![reason.to_string()],
            risk,
            score: None,
            shunt_cost: 0,
        }
    }

    fn classify_weighted(
        &self,
        train_id: &TrainId,
        facts: &FactSnapshot,
        now: NaiveDateTime,
    ) -> Classification {
        let ctx = SignalContext {
            facts,
            config: &self.config,
            now,
        };
        let breakdown = self.scorer.score(train_id, &ctx);

        if let Some((action, reason, risk)) = self.blocking_verdict(train_id, facts, now) {
            return Classification {
                train_id: train_id.clone(),
                action,
                reasons: vec![reason.to_string()],
                risk,
                score: Some(breakdown.score),
                shunt_cost: 0,
            };
        }

        let thresholds = &self.config.thresholds;
        let score = breakdown.score;

        let risk = if score >= thresholds.high_risk {
            RiskLevel::High
        } else if score >= thresholds.medium_risk {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let action = if score >= thresholds.standby {
            InductionAction::Standby
        } else {
            InductionAction::Service
        };

        Classification {
            train_id: train_id.clone(),
            action,
            reasons: self.weighted_reasons(&breakdown),
            risk,
            score: Some(score),
            shunt_cost: 0,
        }
    }

    fn weighted_reasons(&self, breakdown: &ScoreBreakdown) -> Vec<String> {
        let mut reasons: Vec<String> = breakdown
            .readings
            .iter()
            .filter(|(_, r)| r.value >= self.config.thresholds.reason && !r.detail.is_empty())
            .map(|(_, r)| r.detail.clone())
            .collect();
        if reasons.is_empty() {
            reasons.push(REASON_ALL_CLEAR.to_string());
        }
        reasons
    }
}

impl Default for InductionClassifier {
    fn default() -> Self {
        Self::rule_priority()
    }
}
