//! Sword location bookkeeping.
//!
//! The game engine keeps the sword's position in code constants rather than
//! in a data table, so every save patches those constants to match the one
//! sword tile in the level data.

use std::io::{self, Seek, Write};

use tracing::debug;

use crate::codec::BigEndianWriter;
use crate::coords::{ROOM_TILE_HEIGHT, ROOM_TILE_WIDTH, TILE_PIXEL_HEIGHT, TILE_PIXEL_WIDTH};
use crate::region::RegionProfile;

/// Where the sword sits, as written to the engine constants.
///
/// `height` is the level's height in rooms; it is 0 when the sword level
/// does not exist (no sword anywhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwordLocation {
    pub level: usize,
    pub x: usize,
    pub y: usize,
    pub height: usize,
}

impl SwordLocation {
    pub fn missing(level_count: usize) -> Self {
        Self {
            level: level_count + 1,
            x: 1,
            y: 1,
            height: 0,
        }
    }

    fn room_y_pixels(&self) -> u32 {
        (self.y.div_ceil(ROOM_TILE_HEIGHT).saturating_sub(1) * ROOM_TILE_HEIGHT) as u32
            * TILE_PIXEL_HEIGHT
    }

    fn room_x_pixels(&self) -> u32 {
        (self.x.div_ceil(ROOM_TILE_WIDTH).saturating_sub(1) * ROOM_TILE_WIDTH) as u32
            * TILE_PIXEL_WIDTH
    }

    /// RAM address of the sword tile, turned into floor once picked up.
    fn floor_after_pickup(&self, base: u32) -> u32 {
        let column = (self.x - 1) * self.height * ROOM_TILE_HEIGHT;
        base.wrapping_add((column + self.y - 1) as u32)
    }
}

pub fn write_sword_patch<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    profile: &RegionProfile,
    sword: SwordLocation,
) -> io::Result<()> {
    let offsets = &profile.sword;
    let level = sword.level.wrapping_sub(1) as u32;

    w.write_u16_at(offsets.level, level)?;
    w.write_u16_at(offsets.level_without_sword, level)?;
    w.write_u16_at(offsets.room_y, sword.room_y_pixels())?;
    w.write_u16_at(offsets.room_x, sword.room_x_pixels())?;
    w.write_u16_at(
        offsets.tile_y,
        (sword.y as u32 * TILE_PIXEL_HEIGHT).wrapping_sub(9),
    )?;
    w.write_u16_at(
        offsets.tile_x,
        (sword.x as u32 * TILE_PIXEL_WIDTH).wrapping_sub(7),
    )?;
    w.write_u32_at(
        offsets.floor_after_pickup,
        sword.floor_after_pickup(offsets.floor_after_pickup_base),
    )?;

    debug!(
        level = sword.level,
        x = sword.x,
        y = sword.y,
        "sword location patched"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::region::Region;

    fn patch(sword: SwordLocation) -> Vec<u8> {
        let profile = Region::Us.profile();
        let mut w = BigEndianWriter::new(Cursor::new(vec![0u8; 0x30000]));
        write_sword_patch(&mut w, profile, sword).unwrap();
        w.into_inner().into_inner()
    }

    fn word(bytes: &[u8], at: usize) -> u16 {
        u16::from_be_bytes([bytes[at], bytes[at + 1]])
    }

    #[test]
    fn patch_places_sword_in_second_room() {
        let sword = SwordLocation {
            level: 2,
            x: 12,
            y: 5,
            height: 2,
        };
        let bytes = patch(sword);
        assert_eq!(word(&bytes, 0x26D88), 1);
        assert_eq!(word(&bytes, 0x200B6), 1);
        assert_eq!(word(&bytes, 0x26D94), 192);
        assert_eq!(word(&bytes, 0x26DA0), 320);
        assert_eq!(word(&bytes, 0x26DB6), 5 * 64 - 9);
        assert_eq!(word(&bytes, 0x26DBC), 12 * 32 - 7);
        let addr = u32::from_be_bytes(bytes[0x2230C..0x22310].try_into().unwrap());
        assert_eq!(addr, 0xFF15E0 + 11 * 6 + 4);
    }

    #[test]
    fn missing_sword_points_past_last_level() {
        let bytes = patch(SwordLocation::missing(15));
        assert_eq!(word(&bytes, 0x26D88), 15);
        assert_eq!(word(&bytes, 0x26D94), 0);
        assert_eq!(word(&bytes, 0x26DB6), 55);
        let addr = u32::from_be_bytes(bytes[0x2230C..0x22310].try_into().unwrap());
        assert_eq!(addr, 0xFF15E0);
    }
}
