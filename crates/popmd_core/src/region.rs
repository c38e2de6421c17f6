//! Per-region ROM layout knowledge.
//!
//! The two supported releases share a format but place every table at a
//! different address and impose different engine limits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::core_api::{CoreError, CoreErrorCode};

pub const REGION_OFFSET: u64 = 0x01F0;
pub const VERIFY_OFFSETS: [u64; 2] = [0x120, 0x150];
pub const VERIFY_TEXT: &[u8; 16] = b"PRINCE OF PERSIA";
pub const MAX_LEVELS: usize = 17;

pub const PRINCE_RECORD_SIZE: usize = 6;
pub const LEVEL_HEADER_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Us,
    Eu,
}

impl Region {
    pub const US_MARKER: u8 = b'U';
    pub const EU_MARKER: u8 = b'E';

    pub fn marker(self) -> u8 {
        match self {
            Self::Us => Self::US_MARKER,
            Self::Eu => Self::EU_MARKER,
        }
    }

    pub fn profile(self) -> &'static RegionProfile {
        offsets_for(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Eu => "EU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn detect_region(marker: u8) -> Result<Region, CoreError> {
    match marker {
        Region::US_MARKER => Ok(Region::Us),
        Region::EU_MARKER => Ok(Region::Eu),
        other => Err(CoreError::new(
            CoreErrorCode::UnknownRegion,
            format!(
                "unknown region marker 0x{other:02X} at 0x{REGION_OFFSET:04X}, expected 'U' or 'E'"
            ),
        )),
    }
}

pub fn offsets_for(region: Region) -> &'static RegionProfile {
    match region {
        Region::Us => &US_PROFILE,
        Region::Eu => &EU_PROFILE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOffsets {
    pub guards: u64,
    pub doors: u64,
    pub gates: u64,
    pub loose: u64,
    pub raise: u64,
    pub drop: u64,
    pub chompers: u64,
    pub spikes: u64,
    pub potions: u64,
}

impl CategoryOffsets {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Guards => self.guards,
            Category::Doors => self.doors,
            Category::Gates => self.gates,
            Category::Loose => self.loose,
            Category::Raise => self.raise,
            Category::Drop => self.drop,
            Category::Chompers => self.chompers,
            Category::Spikes => self.spikes,
            Category::Potions => self.potions,
        }
    }
}

/// Engine limits, summed over all levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowances {
    pub rooms: usize,
    pub guards: usize,
    pub doors: usize,
    pub gates: usize,
    pub loose: usize,
    pub raise: usize,
    pub drop: usize,
    pub chompers: usize,
    pub spikes: usize,
    pub potions: usize,
}

impl Allowances {
    pub fn for_category(&self, category: Category) -> usize {
        match category {
            Category::Guards => self.guards,
            Category::Doors => self.doors,
            Category::Gates => self.gates,
            Category::Loose => self.loose,
            Category::Raise => self.raise,
            Category::Drop => self.drop,
            Category::Chompers => self.chompers,
            Category::Spikes => self.spikes,
            Category::Potions => self.potions,
        }
    }
}

/// Code addresses holding the sword position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwordPatchOffsets {
    pub level: u64,
    pub level_without_sword: u64,
    pub room_y: u64,
    pub room_x: u64,
    pub tile_y: u64,
    pub tile_x: u64,
    pub floor_after_pickup: u64,
    pub floor_after_pickup_base: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsOffsets {
    pub starting_time: u64,
    pub starting_hit_points: u64,
    pub starting_level: u64,
    pub frames_per_second: u32,
}

/// Pixel adjustment the game expects for one level's prince start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinceCorrection {
    pub level: usize,
    pub dy: u32,
    pub dx: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionProfile {
    pub region: Region,
    pub level_count: usize,
    pub prince_table: u64,
    pub level_table: u64,
    pub tile_block: u64,
    pub categories: CategoryOffsets,
    pub allowances: Allowances,
    pub sword: SwordPatchOffsets,
    pub settings: SettingsOffsets,
    /// Sprite pointer per guard type: guard, skeleton, fat, shadow, Jaffar.
    pub guard_sprites: [u32; 5],
    pub prince_corrections: &'static [PrinceCorrection],
}

impl RegionProfile {
    pub fn prince_correction(&self, level: usize) -> (u32, u32) {
        self.prince_corrections
            .iter()
            .find(|c| c.level == level)
            .map(|c| (c.dy, c.dx))
            .unwrap_or((0, 0))
    }

    pub fn guard_sprite(&self, kind_raw: u16) -> Option<u32> {
        self.guard_sprites.get(kind_raw as usize).copied()
    }

    pub fn directory_len(&self) -> u64 {
        (self.level_count * Category::DIRECTORY_ENTRY_SIZE) as u64
    }
}

static US_PROFILE: RegionProfile = RegionProfile {
    region: Region::Us,
    level_count: 13,
    prince_table: 0x20140,
    level_table: 0x6A5C,
    tile_block: 0x715A,
    categories: CategoryOffsets {
        guards: 0x1FAC,
        doors: 0x41DE,
        gates: 0x5B96,
        loose: 0x1CD3E,
        raise: 0x1E592,
        drop: 0x1EBFC,
        chompers: 0x228DE,
        spikes: 0x25F94,
        potions: 0x27BAE,
    },
    allowances: Allowances {
        rooms: 459,
        guards: 38,
        doors: 22,
        gates: 77,
        loose: 94,
        raise: 90,
        drop: 24,
        chompers: 36,
        spikes: 102,
        potions: 45,
    },
    sword: SwordPatchOffsets {
        level: 0x26D88,
        level_without_sword: 0x200B6,
        room_y: 0x26D94,
        room_x: 0x26DA0,
        tile_y: 0x26DB6,
        tile_x: 0x26DBC,
        floor_after_pickup: 0x2230C,
        floor_after_pickup_base: 0xFF15E0,
    },
    settings: SettingsOffsets {
        starting_time: 0x1DF9C,
        starting_hit_points: 0x1DFAF,
        starting_level: 0x1DFA7,
        frames_per_second: 60,
    },
    guard_sprites: [0x23838, 0x23954, 0x23DD8, 0x24000, 0x241B2],
    prince_corrections: &[PrinceCorrection {
        level: 7,
        dy: 31,
        dx: 0,
    }],
};

static EU_PROFILE: RegionProfile = RegionProfile {
    region: Region::Eu,
    level_count: 17,
    prince_table: 0x504B2,
    level_table: 0x358C2,
    tile_block: 0x36020,
    categories: CategoryOffsets {
        guards: 0x2B02,
        doors: 0x46C2,
        gates: 0x61CE,
        loose: 0x4CF3C,
        raise: 0x4E8F6,
        drop: 0x4F138,
        chompers: 0x52D86,
        spikes: 0x56612,
        potions: 0x581B0,
    },
    allowances: Allowances {
        rooms: 541,
        guards: 51,
        doors: 30,
        gates: 105,
        loose: 122,
        raise: 122,
        drop: 39,
        chompers: 54,
        spikes: 138,
        potions: 59,
    },
    sword: SwordPatchOffsets {
        level: 0x57582,
        level_without_sword: 0x5040A,
        room_y: 0x5758E,
        room_x: 0x5759A,
        tile_y: 0x575B0,
        tile_x: 0x575B6,
        floor_after_pickup: 0x526EC,
        floor_after_pickup_base: 0xFF167A,
    },
    settings: SettingsOffsets {
        starting_time: 0x4E29C,
        starting_hit_points: 0x4E2C1,
        starting_level: 0x4E2A7,
        frames_per_second: 50,
    },
    guard_sprites: [0x53C8C, 0x53DA2, 0x54226, 0x54448, 0x545FA],
    prince_corrections: &[
        PrinceCorrection {
            level: 9,
            dy: 31,
            dx: 0,
        },
        PrinceCorrection {
            level: 1,
            dy: 0,
            dx: 12,
        },
    ],
};

/// Every sprite pointer the loader accepts for a guard type, in any region.
pub fn known_guard_sprites(kind_raw: u16) -> Option<[u32; 2]> {
    let index = kind_raw as usize;
    Some([
        *US_PROFILE.guard_sprites.get(index)?,
        *EU_PROFILE.guard_sprites.get(index)?,
    ])
}
