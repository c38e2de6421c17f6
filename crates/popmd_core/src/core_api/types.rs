use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::coords::RoomPos;
use crate::records::PrinceStart;
use crate::store::Level;
use crate::tile::LevelType;

/// The level and room a front end is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewState {
    pub level: usize,
    pub room_x: usize,
    pub room_y: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            level: 1,
            room_x: 1,
            room_y: 1,
        }
    }
}

impl ViewState {
    pub fn room(&self) -> RoomPos {
        RoomPos::new(self.room_x, self.room_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    QuotaExceeded,
    TileCountMismatch,
    UnorderedTables,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_apply_edits: bool,
    pub can_save: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn from_issues(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: true,
            can_save: !issues.contains(&CapabilityIssue::QuotaExceeded),
            issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelSummary {
    pub number: usize,
    pub width: usize,
    pub height: usize,
    pub rooms: usize,
    pub declared_tiles: u16,
    pub level_type: LevelType,
    pub start_room: RoomPos,
    pub prince: PrinceStart,
    /// Record counts in ROM category order.
    pub counts: Vec<(Category, usize)>,
}

impl LevelSummary {
    pub fn of(level: &Level) -> Self {
        Self {
            number: level.number(),
            width: level.width(),
            height: level.height(),
            rooms: level.room_count(),
            declared_tiles: level.declared_tiles(),
            level_type: level.level_type(),
            start_room: level.start_room(),
            prince: level.prince(),
            counts: Category::ALL
                .iter()
                .map(|&category| (category, level.count(category)))
                .collect(),
        }
    }
}
