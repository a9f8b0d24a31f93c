// ==========================================
// 列车投运排班系统 - 停放股位领域模型
// ==========================================
// 股道: 停放线 S1..S20 / 正线 L1..L6，每条股道 2 个股位
// 存储: 只追加日志；"当前占用" 由 (股道, 股位) 取最新提交派生
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::train::TrainId;
use crate::domain::types::StablingStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STABLING_TRACK_COUNT: u8 = 20;
pub const LINE_TRACK_COUNT: u8 = 6;

// ==========================================
// StablingTrack - 股道
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StablingTrack {
    Stabling(u8), // S1..S20
    Line(u8),     // L1..L6
}

impl StablingTrack {
    /// 解析股道名称
    pub fn parse(name: &str) -> DomainResult<Self> {
        let trimmed = name.trim();
        let invalid = || DomainError::InvalidTrack(name.to_string());

        let mut chars = trimmed.chars();
        let prefix = chars.next().ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: u8 = digits.parse().map_err(|_| invalid())?;

        match prefix {
            'S' if (1..=STABLING_TRACK_COUNT).contains(&number) => {
                Ok(StablingTrack::Stabling(number))
            }
            'L' if (1..=LINE_TRACK_COUNT).contains(&number) => Ok(StablingTrack::Line(number)),
            _ => Err(invalid()),
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, StablingTrack::Line(_))
    }

    pub fn number(&self) -> u8 {
        match self {
            StablingTrack::Stabling(n) | StablingTrack::Line(n) => *n,
        }
    }

    /// 全部股道（停放线在前）
    pub fn all() -> Vec<StablingTrack> {
        (1..=STABLING_TRACK_COUNT)
            .map(StablingTrack::Stabling)
            .chain((1..=LINE_TRACK_COUNT).map(StablingTrack::Line))
            .collect()
    }
}

impl fmt::Display for StablingTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StablingTrack::Stabling(n) => write!(f, "S{}", n),
            StablingTrack::Line(n) => write!(f, "L{}", n),
        }
    }
}

impl TryFrom<String> for StablingTrack {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StablingTrack::parse(&value)
    }
}

impl From<StablingTrack> for String {
    fn from(track: StablingTrack) -> Self {
        track.to_string()
    }
}

// ==========================================
// SlotPosition - 股位（1 或 2）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SlotPosition {
    First,
    Second,
}

impl SlotPosition {
    pub fn from_number(n: u8) -> DomainResult<Self> {
        match n {
            1 => Ok(SlotPosition::First),
            2 => Ok(SlotPosition::Second),
            other => Err(DomainError::InvalidSlot(other)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            SlotPosition::First => 1,
            SlotPosition::Second => 2,
        }
    }
}

impl TryFrom<u8> for SlotPosition {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SlotPosition::from_number(value)
    }
}

impl From<SlotPosition> for u8 {
    fn from(slot: SlotPosition) -> Self {
        slot.number()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StablingDraft {
    pub train_id: TrainId,
    pub track: StablingTrack,
    pub slot: SlotPosition,
    pub status: StablingStatus,
    pub submitted_at: NaiveDateTime,
}

// ==========================================
// StablingGeometry - 股位提交记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StablingGeometry {
    pub id: String,
    pub train_id: TrainId,
    pub track: StablingTrack,
    pub slot: SlotPosition,
    pub status: StablingStatus,
    pub submitted_at: NaiveDateTime,
}

impl StablingGeometry {
    pub fn from_draft(id: String, draft: StablingDraft) -> Self {
        Self {
            id,
            train_id: draft.train_id,
            track: draft.track,
            slot: draft.slot,
            status: draft.status,
            submitted_at: draft.submitted_at,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status == StablingStatus::Occupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracks() {
        assert_eq!(StablingTrack::parse("S1"), Ok(StablingTrack::Stabling(1)));
        assert_eq!(StablingTrack::parse("S20"), Ok(StablingTrack::Stabling(20)));
        assert_eq!(StablingTrack::parse("L6"), Ok(StablingTrack::Line(6)));
        assert!(StablingTrack::parse("S21").is_err());
        assert!(StablingTrack::parse("L7").is_err());
        assert!(StablingTrack::parse("M1").is_err());
        assert!(StablingTrack::parse("").is_err());
        assert!(StablingTrack::parse("S").is_err());
    }

    #[test]
    fn test_track_serde_as_name() {
        let json = serde_json::to_string(&StablingTrack::Line(2)).unwrap();
        assert_eq!(json, "\"L2\"");
        let back: StablingTrack = serde_json::from_str("\"S14\"").unwrap();
        assert_eq!(back, StablingTrack::Stabling(14));
        assert!(serde_json::from_str::<StablingTrack>("\"S99\"").is_err());
    }

    #[test]
    fn test_slot_position() {
        assert_eq!(SlotPosition::from_number(2), Ok(SlotPosition::Second));
        assert_eq!(SlotPosition::from_number(3), Err(DomainError::InvalidSlot(3)));
        assert!(serde_json::from_str::<SlotPosition>("0").is_err());
    }

    #[test]
    fn test_all_tracks() {
        assert_eq!(StablingTrack::all().len(), 26);
    }
}
