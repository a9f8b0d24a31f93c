// ==========================================
// 列车投运排班系统 - 事实库（内存）
// ==========================================
// 职责: 保存车队当前事实，提供一致快照给引擎
// 红线: 引擎只读快照，不修改事实库
// 写入规则:
// - 作业单: 新建 Open，仅可关闭
// - 证书/广告/清洗/股位: 只追加
// - 里程: 按车号覆盖
// ==========================================

use crate::domain::branding::{BrandingDraft, BrandingWindow};
use crate::domain::certificate::{CertificateDraft, FitnessCertificate};
use crate::domain::cleaning::{CleaningData, CleaningDraft};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::job_card::{JobCard, JobCardDraft, JOB_CARD_CODE_BASE};
use crate::domain::mileage::{MileageData, MileageDraft};
use crate::domain::stabling::{SlotPosition, StablingDraft, StablingGeometry, StablingTrack};
use crate::domain::train::TrainId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

// ==========================================
// FactSnapshot - 不可变事实快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSnapshot {
    pub job_cards: Vec<JobCard>,
    pub certificates: Vec<FitnessCertificate>,
    pub branding_windows: Vec<BrandingWindow>,
    pub cleaning: Vec<CleaningData>,
    pub mileage: Vec<MileageData>,
    pub stabling: Vec<StablingGeometry>,
}

impl FactSnapshot {
    // ===== 作业单 =====

    pub fn job_cards_for<'a>(&'a self, train_id: &'a TrainId) -> impl Iterator<Item = &'a JobCard> {
        self.job_cards.iter().filter(move |jc| &jc.train_id == train_id)
    }

    pub fn open_job_cards(&self) -> impl Iterator<Item = &JobCard> {
        self.job_cards.iter().filter(|jc| jc.is_open())
    }

    pub fn has_open_job_card(&self, train_id: &TrainId) -> bool {
        self.job_cards_for(train_id).any(|jc| jc.is_open())
    }

    // ===== 证书 =====

    pub fn certificates_for<'a>(
        &'a self,
        train_id: &'a TrainId,
    ) -> impl Iterator<Item = &'a FitnessCertificate> {
        self.certificates.iter().filter(move |c| &c.train_id == train_id)
    }

    /// 任一部门证书在 today 有效即视为有效
    pub fn has_valid_certificate(&self, train_id: &TrainId, today: NaiveDate) -> bool {
        self.certificates_for(train_id).any(|c| c.is_valid_on(today))
    }

    // ===== 里程 / 广告 / 清洗 =====

    pub fn mileage_for(&self, train_id: &TrainId) -> Option<&MileageData> {
        self.mileage.iter().find(|m| &m.train_id == train_id)
    }

    pub fn branding_for<'a>(
        &'a self,
        train_id: &'a TrainId,
    ) -> impl Iterator<Item = &'a BrandingWindow> {
        self.branding_windows
            .iter()
            .filter(move |w| &w.train_id == train_id)
    }

    /// 最近一次完成的清洗
    pub fn latest_cleaning(&self, train_id: &TrainId) -> Option<&CleaningData> {
        self.cleaning
            .iter()
            .filter(|c| &c.train_id == train_id)
            .max_by_key(|c| (c.completion_date, c.submitted_at))
    }

    /// 清洗记录按提交日期分组（日期倒序）
    pub fn cleaning_by_submission_date(&self) -> Vec<(NaiveDate, Vec<&CleaningData>)> {
        let mut grouped: BTreeMap<NaiveDate, Vec<&CleaningData>> = BTreeMap::new();
        for record in &self.cleaning {
            grouped
                .entry(record.submission_date())
                .or_default()
                .push(record);
        }
        grouped.into_iter().rev().collect()
    }

    // ===== 股位 =====

    /// 当前占用视图: 每个 (股道, 股位) 取最新提交
    ///
    /// 提交时间相同时以后写入者为准
    pub fn current_occupancy(&self) -> BTreeMap<(StablingTrack, SlotPosition), &StablingGeometry> {
        let mut current: BTreeMap<(StablingTrack, SlotPosition), &StablingGeometry> =
            BTreeMap::new();
        for record in &self.stabling {
            let key = (record.track, record.slot);
            match current.get(&key) {
                Some(existing) if existing.submitted_at > record.submitted_at => {}
                _ => {
                    current.insert(key, record);
                }
            }
        }
        current
    }

    /// 列车当前所在股位（仅统计 Occupied）
    ///
    /// 同一列车出现在多个股位时取提交时间最新者
    pub fn position_of(&self, train_id: &TrainId) -> Option<&StablingGeometry> {
        self.current_occupancy()
            .into_values()
            .filter(|g| g.is_occupied() && &g.train_id == train_id)
            .max_by_key(|g| g.submitted_at)
    }

    /// 事实中出现过的全部车号
    pub fn referenced_train_ids(&self) -> BTreeSet<TrainId> {
        let mut ids = BTreeSet::new();
        ids.extend(self.job_cards.iter().map(|x| x.train_id.clone()));
        ids.extend(self.certificates.iter().map(|x| x.train_id.clone()));
        ids.extend(self.branding_windows.iter().map(|x| x.train_id.clone()));
        ids.extend(self.cleaning.iter().map(|x| x.train_id.clone()));
        ids.extend(self.mileage.iter().map(|x| x.train_id.clone()));
        ids.extend(self.stabling.iter().map(|x| x.train_id.clone()));
        ids
    }
}

// ==========================================
// FactSource - 快照来源
// ==========================================
pub trait FactSource {
    /// 获取一致快照
    fn snapshot(&self) -> FactSnapshot;
}

// ==========================================
// FactStore - 内存事实库
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: FactSnapshot,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有快照构造（测试/演示数据）
    pub fn from_snapshot(facts: FactSnapshot) -> Self {
        Self { facts }
    }

    pub fn facts(&self) -> &FactSnapshot {
        &self.facts
    }

    // ==========================================
    // 作业单
    // ==========================================

    pub fn add_job_card(&mut self, draft: JobCardDraft) -> DomainResult<String> {
        draft.validate()?;
        let id = new_id("jc");
        debug!(job_card_id = %id, train_id = %draft.train_id, "新增作业单");
        self.facts.job_cards.push(JobCard::open(id.clone(), draft));
        Ok(id)
    }

    /// 批量新增作业单（全部校验通过才写入）
    pub fn add_job_cards(&mut self, drafts: Vec<JobCardDraft>) -> DomainResult<Vec<String>> {
        for draft in &drafts {
            draft.validate()?;
        }
        let ids = drafts
            .into_iter()
            .map(|draft| {
                let id = new_id("jc");
                self.facts.job_cards.push(JobCard::open(id.clone(), draft));
                id
            })
            .collect();
        Ok(ids)
    }

    /// 关闭作业单
    ///
    /// # 返回
    /// - Ok(true): 状态已变更
    /// - Ok(false): 原本已关闭
    pub fn close_job_card(&mut self, id: &str) -> DomainResult<bool> {
        let card = self
            .facts
            .job_cards
            .iter_mut()
            .find(|jc| jc.id == id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "JobCard".to_string(),
                id: id.to_string(),
            })?;
        let changed = card.close();
        debug!(job_card_id = %id, changed, "关闭作业单");
        Ok(changed)
    }

    pub fn job_card(&self, id: &str) -> Option<&JobCard> {
        self.facts.job_cards.iter().find(|jc| jc.id == id)
    }

    /// 下一个作业单编号: JOB{max(现有编号, 2000) + 1}
    pub fn next_job_card_code(&self) -> String {
        let max = self
            .facts
            .job_cards
            .iter()
            .filter_map(|jc| jc.code_number())
            .fold(JOB_CARD_CODE_BASE, u32::max);
        format!("JOB{}", max + 1)
    }

    // ==========================================
    // 证书
    // ==========================================

    pub fn add_certificate(&mut self, draft: CertificateDraft) -> DomainResult<String> {
        draft.validate()?;
        let id = new_id("fc");
        debug!(certificate_id = %id, train_id = %draft.train_id, "新增适用证书");
        self.facts
            .certificates
            .push(FitnessCertificate::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// 批量新增证书（全部校验通过才写入）
    pub fn add_certificates(&mut self, drafts: Vec<CertificateDraft>) -> DomainResult<Vec<String>> {
        for draft in &drafts {
            draft.validate()?;
        }
        let ids = drafts
            .into_iter()
            .map(|draft| {
                let id = new_id("fc");
                self.facts
                    .certificates
                    .push(FitnessCertificate::from_draft(id.clone(), draft));
                id
            })
            .collect();
        Ok(ids)
    }

    // ==========================================
    // 广告窗口
    // ==========================================

    pub fn add_branding_window(&mut self, draft: BrandingDraft) -> DomainResult<String> {
        draft.validate()?;
        let id = new_id("bw");
        self.facts
            .branding_windows
            .push(BrandingWindow::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// 重新上报曝光小时数
    pub fn record_branding_exposure(&mut self, id: &str, hours: f64) -> DomainResult<()> {
        let window = self
            .facts
            .branding_windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "BrandingWindow".to_string(),
                id: id.to_string(),
            })?;
        window.record_exposure(hours)
    }

    // ==========================================
    // 清洗 / 里程 / 股位
    // ==========================================

    pub fn add_cleaning(&mut self, draft: CleaningDraft) -> DomainResult<String> {
        draft.validate()?;
        let id = new_id("cd");
        self.facts
            .cleaning
            .push(CleaningData::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// 按车号覆盖里程记录（保留原 ID）
    pub fn upsert_mileage(&mut self, draft: MileageDraft) -> DomainResult<String> {
        draft.validate()?;
        if let Some(existing) = self
            .facts
            .mileage
            .iter_mut()
            .find(|m| m.train_id == draft.train_id)
        {
            let id = existing.id.clone();
            *existing = MileageData::from_draft(id.clone(), draft);
            debug!(mileage_id = %id, "覆盖里程记录");
            return Ok(id);
        }

        let id = new_id("md");
        self.facts
            .mileage
            .push(MileageData::from_draft(id.clone(), draft));
        Ok(id)
    }

    pub fn add_stabling(&mut self, draft: StablingDraft) -> DomainResult<String> {
        let id = new_id("sg");
        self.facts
            .stabling
            .push(StablingGeometry::from_draft(id.clone(), draft));
        Ok(id)
    }
}

impl FactSource for FactStore {
    fn snapshot(&self) -> FactSnapshot {
        self.facts.clone()
    }
}
