//! Pixel and tile coordinate conversions.
//!
//! Bottom-anchored objects store the last pixel row of their tile, top
//! anchored ones the first. Tile coordinates are 1-based. Saving uses
//! wrapping arithmetic so out-of-range tiles produce the same truncated
//! words the game data would contain.

use serde::{Deserialize, Serialize};

pub const ROOM_TILE_WIDTH: usize = 10;
pub const ROOM_TILE_HEIGHT: usize = 3;
pub const TILES_PER_ROOM: usize = ROOM_TILE_WIDTH * ROOM_TILE_HEIGHT;
/// Largest width or height, in rooms, an edited level may take.
pub const MAX_LEVEL_ROOMS: usize = 24;

pub const TILE_PIXEL_WIDTH: u32 = 32;
pub const TILE_PIXEL_HEIGHT: u32 = 64;
pub const ROOM_PIXEL_WIDTH: u32 = TILE_PIXEL_WIDTH * ROOM_TILE_WIDTH as u32;
pub const ROOM_PIXEL_HEIGHT: u32 = TILE_PIXEL_HEIGHT * ROOM_TILE_HEIGHT as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Top,
    Bottom,
}

impl Anchor {
    pub fn load_y(self, pixel: u16) -> usize {
        match self {
            Self::Top => load_y_top(pixel),
            Self::Bottom => load_y_bottom(pixel),
        }
    }

    pub fn save_y(self, row: usize) -> u32 {
        match self {
            Self::Top => save_y_top(row),
            Self::Bottom => save_y_bottom(row),
        }
    }
}

pub fn load_y_bottom(pixel: u16) -> usize {
    (pixel as usize + 1) / TILE_PIXEL_HEIGHT as usize
}

pub fn save_y_bottom(row: usize) -> u32 {
    (row as u32).wrapping_mul(TILE_PIXEL_HEIGHT).wrapping_sub(1)
}

pub fn load_y_top(pixel: u16) -> usize {
    pixel as usize / TILE_PIXEL_HEIGHT as usize + 1
}

pub fn save_y_top(row: usize) -> u32 {
    (row as u32).wrapping_sub(1).wrapping_mul(TILE_PIXEL_HEIGHT)
}

pub fn load_x(pixel: u16) -> usize {
    pixel as usize / TILE_PIXEL_WIDTH as usize + 1
}

pub fn save_x(column: usize) -> u32 {
    (column as u32).wrapping_sub(1).wrapping_mul(TILE_PIXEL_WIDTH)
}

pub fn load_room_y(pixel: u16) -> usize {
    pixel as usize / ROOM_PIXEL_HEIGHT as usize + 1
}

pub fn save_room_y(room: usize) -> u32 {
    (room as u32).wrapping_sub(1).wrapping_mul(ROOM_PIXEL_HEIGHT)
}

pub fn load_room_x(pixel: u16) -> usize {
    pixel as usize / ROOM_PIXEL_WIDTH as usize + 1
}

pub fn save_room_x(room: usize) -> u32 {
    (room as u32).wrapping_sub(1).wrapping_mul(ROOM_PIXEL_WIDTH)
}

/// Absolute tile coordinate inside a level, both axes starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilePos {
    pub x: usize,
    pub y: usize,
}

impl TilePos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn room(&self) -> RoomPos {
        RoomPos {
            x: self.x.saturating_sub(1) / ROOM_TILE_WIDTH + 1,
            y: self.y.saturating_sub(1) / ROOM_TILE_HEIGHT + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomPos {
    pub x: usize,
    pub y: usize,
}

impl RoomPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Every tile of the room, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + use<> {
        let left = (self.x - 1) * ROOM_TILE_WIDTH;
        let top = (self.y - 1) * ROOM_TILE_HEIGHT;
        (1..=ROOM_TILE_WIDTH).flat_map(move |dx| {
            (1..=ROOM_TILE_HEIGHT).map(move |dy| TilePos::new(left + dx, top + dy))
        })
    }
}
