// ==========================================
// 列车投运排班系统 - 风险信号（加权模式）
// ==========================================
// 职责: 把单车事实折算为 [0,1] 的信号值
// 信号:
// - mileage:   保养后里程 / 保养间隔
// - job_cards: 作业单严重度 与 证书临期程度 取大
// - branding:  广告 SLA 压力
// - cleaning:  距上次清洗天数 / 允许天数
// 综合分 = Σ wᵢ·sᵢ / Σ wᵢ （权重全为 0 时为 0）
// 红线: 信号只读快照，不产生副作用
// ==========================================

use crate::config::engine_config::{EngineConfig, SchedulerWeights};
use crate::domain::train::TrainId;
use crate::domain::types::{JobPriority, SlaStatus};
use crate::repository::fact_store::FactSnapshot;
use chrono::NaiveDateTime;
use std::sync::Arc;

// ==========================================
// SignalContext - 信号求值上下文
// ==========================================
pub struct SignalContext<'a> {
    pub facts: &'a FactSnapshot,
    pub config: &'a EngineConfig,
    pub now: NaiveDateTime,
}

/// 单项信号读数
#[derive(Debug, Clone, PartialEq)]
pub struct SignalReading {
    pub value: f64,
    /// 达到原因阈值时展示的说明
    pub detail: String,
}

impl SignalReading {
    fn new(value: f64, detail: impl Into<String>) -> Self {
        Self {
            value: clamp_unit(value),
            detail: detail.into(),
        }
    }

    fn zero() -> Self {
        Self {
            value: 0.0,
            detail: String::new(),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ==========================================
// RiskSignal - 信号接口
// ==========================================
pub trait RiskSignal: Send + Sync {
    /// 信号名称（与权重键一致）
    fn name(&self) -> &'static str;

    /// 计算信号值
    fn evaluate(&self, train_id: &TrainId, ctx: &SignalContext) -> SignalReading;
}

// ==========================================
// 里程
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct MileageSignal;

impl RiskSignal for MileageSignal {
    fn name(&self) -> &'static str {
        "mileage"
    }

    fn evaluate(&self, train_id: &TrainId, ctx: &SignalContext) -> SignalReading {
        match ctx.facts.mileage_for(train_id) {
            Some(m) => SignalReading::new(
                m.km_since_maintenance / ctx.config.maintenance_km_limit,
                format!("High mileage since maintenance ({:.0} km)", m.km_since_maintenance),
            ),
            None => SignalReading::zero(),
        }
    }
}

// ==========================================
// 作业单 / 证书
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSignal;

fn priority_severity(priority: JobPriority) -> f64 {
    match priority {
        JobPriority::High => 1.0,
        JobPriority::Medium => 0.7,
        JobPriority::Low => 0.4,
    }
}

impl RiskSignal for MaintenanceSignal {
    fn name(&self) -> &'static str {
        "job_cards"
    }

    fn evaluate(&self, train_id: &TrainId, ctx: &SignalContext) -> SignalReading {
        let today = ctx.now.date();

        let card_pressure = ctx
            .facts
            .job_cards_for(train_id)
            .filter(|jc| jc.is_open())
            .map(|jc| {
                if jc.is_overdue(today) {
                    1.0
                } else {
                    priority_severity(jc.priority)
                }
            })
            .fold(0.0_f64, f64::max);

        // 有效证书中最晚到期者
        let days_to_expiry = ctx
            .facts
            .certificates_for(train_id)
            .filter(|c| c.is_valid_on(today))
            .map(|c| c.days_until_expiry(today))
            .max();

        let cert_pressure = match days_to_expiry {
            Some(days) => 1.0 - days as f64 / ctx.config.cert_warning_days as f64,
            None => 1.0,
        };
        let cert_pressure = clamp_unit(cert_pressure);

        if card_pressure >= cert_pressure && card_pressure > 0.0 {
            SignalReading::new(card_pressure, "Outstanding maintenance job cards")
        } else {
            let detail = match days_to_expiry {
                Some(days) => format!("Fitness certificate expiring in {} days", days),
                None => "Missing valid fitness certificate".to_string(),
            };
            SignalReading::new(cert_pressure, detail)
        }
    }
}

// ==========================================
// 广告 SLA
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct BrandingSignal;

impl RiskSignal for BrandingSignal {
    fn name(&self) -> &'static str {
        "branding"
    }

    fn evaluate(&self, train_id: &TrainId, ctx: &SignalContext) -> SignalReading {
        let mut best = SignalReading::zero();
        for window in ctx.facts.branding_for(train_id) {
            let sla = window.sla(ctx.now);
            let reading = match sla.status {
                SlaStatus::Breached => SignalReading::new(
                    1.0,
                    format!("Branding SLA breached ({})", window.brand_name),
                ),
                SlaStatus::InProgress if window.is_at_risk(ctx.now) => SignalReading::new(
                    1.0,
                    format!("Branding SLA at risk ({})", window.brand_name),
                ),
                SlaStatus::InProgress if window.required_hours > 0.0 => {
                    let outstanding =
                        (window.required_hours - sla.elapsed_hours as f64) / window.required_hours;
                    SignalReading::new(
                        outstanding,
                        format!("Branding exposure pending ({})", window.brand_name),
                    )
                }
                _ => SignalReading::zero(),
            };
            if reading.value > best.value {
                best = reading;
            }
        }
        best
    }
}

// ==========================================
// 清洗
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CleaningSignal;

impl RiskSignal for CleaningSignal {
    fn name(&self) -> &'static str {
        "cleaning"
    }

    fn evaluate(&self, train_id: &TrainId, ctx: &SignalContext) -> SignalReading {
        match ctx.facts.latest_cleaning(train_id) {
            Some(record) => {
                let days = record.days_since_completion(ctx.now.date());
                SignalReading::new(
                    days as f64 / ctx.config.cleaning_staleness_days as f64,
                    format!("Cleaning overdue ({} days since last)", days),
                )
            }
            None => SignalReading::new(1.0, "No cleaning record"),
        }
    }
}

// ==========================================
// WeightedScorer - 加权组合
// ==========================================
#[derive(Clone)]
struct WeightedSignal {
    signal: Arc<dyn RiskSignal>,
    weight: f64,
}

/// 综合评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    /// (信号名, 读数)，按注册顺序，仅含权重 > 0 的信号
    pub readings: Vec<(&'static str, SignalReading)>,
}

#[derive(Clone)]
pub struct WeightedScorer {
    signals: Vec<WeightedSignal>,
}

impl WeightedScorer {
    pub fn new() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    /// 按配置权重注册四项标准信号
    pub fn from_weights(weights: &SchedulerWeights) -> Self {
        Self::new()
            .with_signal(MileageSignal, weights.mileage)
            .with_signal(MaintenanceSignal, weights.job_cards)
            .with_signal(BrandingSignal, weights.branding)
            .with_signal(CleaningSignal, weights.cleaning)
    }

    pub fn with_signal<S: RiskSignal + 'static>(mut self, signal: S, weight: f64) -> Self {
        self.signals.push(WeightedSignal {
            signal: Arc::new(signal),
            weight,
        });
        self
    }

    pub fn score(&self, train_id: &TrainId, ctx: &SignalContext) -> ScoreBreakdown {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        let mut readings = Vec::with_capacity(self.signals.len());

        for ws in &self.signals {
            // 零权重信号不参与评分，也不产生原因
            if ws.weight <= 0.0 {
                continue;
            }
            let reading = ws.signal.evaluate(train_id, ctx);
            weighted_sum += ws.weight * reading.value;
            total_weight += ws.weight;
            readings.push((ws.signal.name(), reading));
        }

        let score = if total_weight > 0.0 {
            clamp_unit(weighted_sum / total_weight)
        } else {
            0.0
        };

        ScoreBreakdown { score, readings }
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::from_weights(&SchedulerWeights::default())
    }
}
