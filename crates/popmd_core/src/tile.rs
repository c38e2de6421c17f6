use std::fmt;

use serde::{Deserialize, Serialize};

/// Object plane value of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileObject {
    Space,
    Wall,
    Floor,
    Raise,
    Drop,
    Gate,
    Loose,
    Spike,
    Chomper,
    Potion,
    Door,
    Sword,
    Unknown(u8),
}

impl TileObject {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Space,
            0x01 => Self::Wall,
            0x02 => Self::Floor,
            0x03 => Self::Raise,
            0x04 => Self::Drop,
            0x05 => Self::Gate,
            0x06 => Self::Loose,
            0x07 => Self::Spike,
            0x08 => Self::Chomper,
            0x09 => Self::Potion,
            0x0A => Self::Door,
            0x0B => Self::Sword,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::Space => 0x00,
            Self::Wall => 0x01,
            Self::Floor => 0x02,
            Self::Raise => 0x03,
            Self::Drop => 0x04,
            Self::Gate => 0x05,
            Self::Loose => 0x06,
            Self::Spike => 0x07,
            Self::Chomper => 0x08,
            Self::Potion => 0x09,
            Self::Door => 0x0A,
            Self::Sword => 0x0B,
            Self::Unknown(other) => other,
        }
    }

    /// Three letter code used by the tile map dump.
    pub fn code(&self) -> &'static str {
        match *self {
            Self::Space => "spc",
            Self::Wall => "wal",
            Self::Floor => "flr",
            Self::Raise => "rbt",
            Self::Drop => "dbt",
            Self::Gate => "gat",
            Self::Loose => "loo",
            Self::Spike => "spk",
            Self::Chomper => "cho",
            Self::Potion => "pot",
            Self::Door => "dor",
            Self::Sword => "swd",
            Self::Unknown(_) => "???",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let object = match code.to_ascii_lowercase().as_str() {
            "spc" | "space" => Self::Space,
            "wal" | "wall" => Self::Wall,
            "flr" | "floor" => Self::Floor,
            "rbt" | "raise" => Self::Raise,
            "dbt" | "drop" => Self::Drop,
            "gat" | "gate" => Self::Gate,
            "loo" | "loose" => Self::Loose,
            "spk" | "spike" | "spikes" => Self::Spike,
            "cho" | "chomper" => Self::Chomper,
            "pot" | "potion" => Self::Potion,
            "dor" | "door" => Self::Door,
            "swd" | "sword" => Self::Sword,
            other => {
                let hex = other.strip_prefix("0x")?;
                Self::from_raw(u8::from_str_radix(hex, 16).ok()?)
            }
        };
        Some(object)
    }
}

impl fmt::Display for TileObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "x{v:02X}"),
            _ => f.write_str(self.code()),
        }
    }
}

/// Tile set used by a level. Anything but 0 renders as palace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelType {
    Dungeon,
    Palace,
    Unknown(u16),
}

impl LevelType {
    pub const DUNGEON_RAW: u16 = 0;
    pub const PALACE_RAW: u16 = 1;

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            Self::DUNGEON_RAW => Self::Dungeon,
            Self::PALACE_RAW => Self::Palace,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            Self::Dungeon => Self::DUNGEON_RAW,
            Self::Palace => Self::PALACE_RAW,
            Self::Unknown(other) => other,
        }
    }

    pub fn is_dungeon(&self) -> bool {
        matches!(self, Self::Dungeon)
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Dungeon => "dungeon",
            Self::Palace | Self::Unknown(_) => "palace",
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tile {
    pub object: TileObject,
    pub graphics: u8,
}
