// ==========================================
// 列车投运排班系统 - 车号与车队
// ==========================================
// 车号: 不透明字符串，规范格式 T + 3 位数字（T001..T025）
// 车队: 固定规模（默认 25 列）+ 事实中出现的额外车号
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// 默认车队规模
pub const DEFAULT_FLEET_SIZE: u32 = 25;

/// 导入校验用的规范车号格式
static CANONICAL_TRAIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T\d{3}$").expect("train id pattern is a valid regex"));

// ==========================================
// TrainId - 车号
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainId(String);

impl TrainId {
    /// 构造车号（不校验格式，容忍规范范围外的未来车号）
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// 按规范格式解析车号
    ///
    /// # 规则
    /// - 必须匹配 `^T\d{3}$`
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if CANONICAL_TRAIN_ID.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidTrainId(raw.to_string()))
        }
    }

    /// 按序号生成规范车号: 1 → T001
    pub fn from_number(number: u32) -> Self {
        Self(format!("T{:03}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_canonical(&self) -> bool {
        CANONICAL_TRAIN_ID.is_match(&self.0)
    }

    /// 车号数字部分（非 T+数字 形式返回 None）
    pub fn number(&self) -> Option<u32> {
        self.0.strip_prefix('T').and_then(|digits| digits.parse().ok())
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrainId {
    fn from(value: &str) -> Self {
        TrainId::new(value)
    }
}

// 数字车号按数值排序，其余车号排在后面按字典序
impl Ord for TrainId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number(), other.number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TrainId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ==========================================
// Fleet - 参与排班的车队
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    trains: Vec<TrainId>,
}

impl Fleet {
    /// T001..T{size}
    pub fn with_size(size: u32) -> Self {
        Self {
            trains: (1..=size).map(TrainId::from_number).collect(),
        }
    }

    /// 指定车号集合（去重并排序）
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = TrainId>,
    {
        let unique: BTreeSet<TrainId> = ids.into_iter().collect();
        Self {
            trains: unique.into_iter().collect(),
        }
    }

    /// 合并事实中出现的车号
    pub fn extended_with<'a, I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a TrainId>,
    {
        let mut unique: BTreeSet<TrainId> = self.trains.iter().cloned().collect();
        unique.extend(ids.into_iter().cloned());
        Self {
            trains: unique.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainId> {
        self.trains.iter()
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    pub fn contains(&self, train_id: &TrainId) -> bool {
        self.trains.contains(train_id)
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::with_size(DEFAULT_FLEET_SIZE)
    }
}
