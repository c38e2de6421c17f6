//! Category records and the text classifiers shown next to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::coords::TilePos;
use crate::facing::Facing;
use crate::region::RegionProfile;

pub trait Positioned {
    fn pos(&self) -> TilePos;
}

macro_rules! positioned {
    ($($ty:ty),* $(,)?) => {
        $(impl Positioned for $ty {
            fn pos(&self) -> TilePos {
                TilePos::new(self.x, self.y)
            }
        })*
    };
}

positioned!(Guard, Door, Gate, LooseFloor, Plate, Chomper, Spike, Potion);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardKind {
    Guard,
    Skeleton,
    Fat,
    Shadow,
    Jaffar,
    Unknown(u16),
}

impl GuardKind {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Guard,
            1 => Self::Skeleton,
            2 => Self::Fat,
            3 => Self::Shadow,
            4 => Self::Jaffar,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            Self::Guard => 0,
            Self::Skeleton => 1,
            Self::Fat => 2,
            Self::Shadow => 3,
            Self::Jaffar => 4,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Guard => "guard",
            Self::Skeleton => "skeleton",
            Self::Fat => "fat",
            Self::Shadow => "shadow",
            Self::Jaffar => "Jaffar",
            Self::Unknown(_) => "?",
        }
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "? ({v})"),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Guard {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
    pub sprite: u32,
    pub kind: GuardKind,
    pub skill: u32,
    pub hit_points: u32,
}

impl Guard {
    pub const DEFAULT_SKILL: u32 = 0;
    pub const DEFAULT_HIT_POINTS: u32 = 3;

    /// A guard with the sprite the region's engine expects for `kind`.
    pub fn new(
        pos: TilePos,
        kind: GuardKind,
        facing: Facing,
        skill: u32,
        hit_points: u32,
        profile: &RegionProfile,
    ) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            facing,
            sprite: profile.guard_sprite(kind.raw()).unwrap_or(0),
            kind,
            skill,
            hit_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorKind {
    Entrance,
    Exit,
    Unknown(u16),
}

impl DoorKind {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Entrance,
            2 => Self::Exit,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            Self::Entrance => 0,
            Self::Exit => 2,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Entrance => "entrance",
            Self::Exit => "exit",
            Self::Unknown(_) => "?",
        }
    }
}

impl fmt::Display for DoorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Door {
    pub x: usize,
    pub y: usize,
    pub kind: DoorKind,
}

/// Named gate configurations. Anything that does not match one of the
/// four known tuples exactly is `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Closed,
    CloseOnStart,
    Open,
    OpenOnStart,
    Custom,
}

impl GateState {
    pub fn classify(state1: u16, state2: u16, state3: u16) -> Self {
        match (state1, state2, state3) {
            (0, 0, 0) => Self::Closed,
            (7, 12, 0) => Self::CloseOnStart,
            (3, 12, 0xFFFF) => Self::Open,
            (1, 0, 0) => Self::OpenOnStart,
            _ => Self::Custom,
        }
    }

    pub fn words(self) -> Option<(u16, u16, u16)> {
        match self {
            Self::Closed => Some((0, 0, 0)),
            Self::CloseOnStart => Some((7, 12, 0)),
            Self::Open => Some((3, 12, 0xFFFF)),
            Self::OpenOnStart => Some((1, 0, 0)),
            Self::Custom => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::CloseOnStart => "c on start",
            Self::Open => "open",
            Self::OpenOnStart => "o on start",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gate {
    pub x: usize,
    pub y: usize,
    pub state1: u16,
    pub state2: u16,
    pub state3: u16,
    pub unknown: u16,
}

impl Gate {
    pub fn at(pos: TilePos) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            state1: 0,
            state2: 0,
            state3: 0,
            unknown: 0,
        }
    }

    pub fn state(&self) -> GateState {
        GateState::classify(self.state1, self.state2, self.state3)
    }
}

/// What a raise or drop plate triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRef {
    None,
    Mirror,
    Exit,
    /// 1-based position in the level's gate table.
    Gate(u16),
}

impl GateRef {
    pub const NONE_RAW: u16 = 0xFFFD;
    pub const MIRROR_RAW: u16 = 0xFFFE;
    pub const EXIT_RAW: u16 = 0xFFFF;

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            Self::NONE_RAW => Self::None,
            Self::MIRROR_RAW => Self::Mirror,
            Self::EXIT_RAW => Self::Exit,
            index => Self::Gate(index + 1),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            Self::None => Self::NONE_RAW,
            Self::Mirror => Self::MIRROR_RAW,
            Self::Exit => Self::EXIT_RAW,
            Self::Gate(ordinal) => ordinal.wrapping_sub(1),
        }
    }

    pub fn ordinal(&self) -> Option<usize> {
        match *self {
            Self::Gate(ordinal) => Some(ordinal as usize),
            _ => None,
        }
    }
}

impl fmt::Display for GateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::None => f.write_str("X"),
            Self::Mirror => f.write_str("mirror"),
            Self::Exit => f.write_str("exit"),
            Self::Gate(ordinal) => write!(f, "{ordinal}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LooseFloor {
    pub x: usize,
    pub y: usize,
}

/// Raise or drop pressure plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plate {
    pub x: usize,
    pub y: usize,
    pub gates: [GateRef; 3],
}

impl Plate {
    pub fn at(pos: TilePos) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            gates: [GateRef::Gate(1), GateRef::None, GateRef::None],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chomper {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spike {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Potion {
    pub x: usize,
    pub y: usize,
    pub color: u16,
    pub effect: u16,
}

impl Potion {
    pub const RED: u16 = 1;
    pub const GREEN: u16 = 3;

    pub fn color_text(&self) -> String {
        potion_color_text(self.color)
    }

    pub fn effect_text(&self) -> String {
        potion_effect_text(self.effect)
    }
}

pub fn potion_color_text(color: u16) -> String {
    match color {
        Potion::RED => "red".to_string(),
        Potion::GREEN => "green".to_string(),
        other => other.to_string(),
    }
}

pub fn potion_effect_text(effect: u16) -> String {
    match effect {
        0 => "heal".to_string(),
        1 => "life".to_string(),
        2 => "hurt".to_string(),
        3 => "float".to_string(),
        4 => "loose".to_string(),
        5 => "stop".to_string(),
        6..=9 => "time".to_string(),
        other => other.to_string(),
    }
}

/// One record of any category, used where the category is only known at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    Guard(Guard),
    Door(Door),
    Gate(Gate),
    Loose(LooseFloor),
    Raise(Plate),
    Drop(Plate),
    Chomper(Chomper),
    Spike(Spike),
    Potion(Potion),
}

impl Record {
    /// Fresh record as placed by a tile edit, before any field is filled in.
    pub fn default_for(category: Category, pos: TilePos, profile: &RegionProfile) -> Self {
        let TilePos { x, y } = pos;
        match category {
            Category::Guards => Self::Guard(Guard::new(
                pos,
                GuardKind::Guard,
                Facing::Right,
                Guard::DEFAULT_SKILL,
                Guard::DEFAULT_HIT_POINTS,
                profile,
            )),
            Category::Doors => Self::Door(Door {
                x,
                y,
                kind: DoorKind::Entrance,
            }),
            Category::Gates => Self::Gate(Gate::at(pos)),
            Category::Loose => Self::Loose(LooseFloor { x, y }),
            Category::Raise => Self::Raise(Plate::at(pos)),
            Category::Drop => Self::Drop(Plate::at(pos)),
            Category::Chompers => Self::Chomper(Chomper { x, y }),
            Category::Spikes => Self::Spike(Spike { x, y }),
            Category::Potions => Self::Potion(Potion {
                x,
                y,
                color: Potion::RED,
                effect: 0,
            }),
        }
    }

    /// Same fields, different tile.
    pub fn moved_to(mut self, pos: TilePos) -> Self {
        let TilePos { x, y } = pos;
        macro_rules! relocate {
            ($r:expr) => {{
                $r.x = x;
                $r.y = y;
            }};
        }
        match &mut self {
            Self::Guard(r) => relocate!(r),
            Self::Door(r) => relocate!(r),
            Self::Gate(r) => relocate!(r),
            Self::Loose(r) => relocate!(r),
            Self::Raise(r) | Self::Drop(r) => relocate!(r),
            Self::Chomper(r) => relocate!(r),
            Self::Spike(r) => relocate!(r),
            Self::Potion(r) => relocate!(r),
        }
        self
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Guard(_) => Category::Guards,
            Self::Door(_) => Category::Doors,
            Self::Gate(_) => Category::Gates,
            Self::Loose(_) => Category::Loose,
            Self::Raise(_) => Category::Raise,
            Self::Drop(_) => Category::Drop,
            Self::Chomper(_) => Category::Chompers,
            Self::Spike(_) => Category::Spikes,
            Self::Potion(_) => Category::Potions,
        }
    }
}

impl Positioned for Record {
    fn pos(&self) -> TilePos {
        match self {
            Self::Guard(r) => r.pos(),
            Self::Door(r) => r.pos(),
            Self::Gate(r) => r.pos(),
            Self::Loose(r) => r.pos(),
            Self::Raise(r) | Self::Drop(r) => r.pos(),
            Self::Chomper(r) => r.pos(),
            Self::Spike(r) => r.pos(),
            Self::Potion(r) => r.pos(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrinceStart {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
}
