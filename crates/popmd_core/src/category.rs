use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Anchor;
use crate::tile::TileObject;

/// Positioned object kinds with their own per-level tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Guards,
    Doors,
    Gates,
    Loose,
    Raise,
    Drop,
    Chompers,
    Spikes,
    Potions,
}

impl Category {
    /// Table order inside the ROM, which is also the load and save order.
    pub const ALL: [Category; 9] = [
        Category::Guards,
        Category::Doors,
        Category::Gates,
        Category::Loose,
        Category::Raise,
        Category::Drop,
        Category::Chompers,
        Category::Spikes,
        Category::Potions,
    ];

    pub const DIRECTORY_ENTRY_SIZE: usize = 6;

    pub fn record_size(self) -> usize {
        match self {
            Self::Guards => 24,
            Self::Doors => 10,
            Self::Gates => 12,
            Self::Loose => 10,
            Self::Raise => 14,
            Self::Drop => 14,
            Self::Chompers => 10,
            Self::Spikes => 8,
            Self::Potions => 10,
        }
    }

    pub fn anchor(self) -> Anchor {
        match self {
            Self::Doors | Self::Gates | Self::Chompers => Anchor::Top,
            Self::Guards
            | Self::Loose
            | Self::Raise
            | Self::Drop
            | Self::Spikes
            | Self::Potions => Anchor::Bottom,
        }
    }

    /// Category whose record accompanies a tile object, if any. Guards are
    /// not tile objects and never map here.
    pub fn for_object(object: TileObject) -> Option<Self> {
        match object {
            TileObject::Raise => Some(Self::Raise),
            TileObject::Drop => Some(Self::Drop),
            TileObject::Gate => Some(Self::Gates),
            TileObject::Loose => Some(Self::Loose),
            TileObject::Spike => Some(Self::Spikes),
            TileObject::Chomper => Some(Self::Chompers),
            TileObject::Potion => Some(Self::Potions),
            TileObject::Door => Some(Self::Doors),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guards => "guards",
            Self::Doors => "doors",
            Self::Gates => "gates",
            Self::Loose => "loose",
            Self::Raise => "raise",
            Self::Drop => "drop",
            Self::Chompers => "chompers",
            Self::Spikes => "spikes",
            Self::Potions => "potions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
