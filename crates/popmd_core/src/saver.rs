//! [`LevelStore`] → ROM encoding.
//!
//! Writes go over an existing ROM image: only the level tables, the tile
//! block, the category tables and the sword constants are touched.

use std::io::{Seek, Write};

use tracing::{debug, info, warn};

use crate::category::Category;
use crate::codec::BigEndianWriter;
use crate::coords::{
    ROOM_PIXEL_HEIGHT, ROOM_PIXEL_WIDTH, TILES_PER_ROOM, save_room_x, save_room_y, save_x, save_y_bottom,
};
use crate::core_api::CoreError;
use crate::layout::TileBlockLayout;
use crate::record_codec::encode_record;
use crate::region::RegionProfile;
use crate::store::{Level, LevelStore};
use crate::sword::{SwordLocation, write_sword_patch};
use crate::tile::TileObject;

fn write_prince_table<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    profile: &RegionProfile,
    levels: &[Level],
) -> Result<(), CoreError> {
    w.seek_to(profile.prince_table)?;
    for level in levels {
        let prince = level.prince();
        let (dy, dx) = profile.prince_correction(level.number());
        w.write_u16(save_y_bottom(prince.y).wrapping_add(dy))?;
        w.write_u16(save_x(prince.x).wrapping_add(dx))?;
        w.write_u16(prince.facing.raw() as u32)?;
    }
    Ok(())
}

fn write_level_headers<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    profile: &RegionProfile,
    levels: &[Level],
    layout: &TileBlockLayout,
) -> Result<(), CoreError> {
    w.seek_to(profile.level_table)?;
    for level in levels {
        let number = level.number();
        let tiles = level.width() * level.height() * TILES_PER_ROOM;
        if tiles != level.declared_tiles() as usize {
            warn!(
                level = number,
                tiles,
                declared = level.declared_tiles(),
                "incorrect number of tiles"
            );
        }
        let graphics = layout.graphics(number).map_or(0, |r| r.start);
        let objects = layout.objects(number).map_or(0, |r| r.start);
        let start = level.start_room();

        w.write_u16(level.height() as u32 * ROOM_PIXEL_HEIGHT)?;
        w.write_u16(level.width() as u32 * ROOM_PIXEL_WIDTH)?;
        w.write_u16(tiles as u32)?;
        w.write_u32(graphics as u32)?;
        w.write_u32(objects as u32)?;
        w.write_u16(save_room_y(start.y))?;
        w.write_u16(save_room_x(start.x))?;
        w.write_u16(level.level_type().raw() as u32)?;
    }
    Ok(())
}

/// Write every plane and return where the sword ended up.
fn write_planes<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    levels: &[Level],
    layout: &TileBlockLayout,
) -> Result<SwordLocation, CoreError> {
    layout.validate()?;
    let mut sword = SwordLocation::missing(levels.len());

    w.seek_to(layout.base)?;
    for level in levels {
        w.write_bytes(level.graphics_plane())?;
        w.write_bytes(level.object_plane())?;
        // The last sword in write order wins.
        for pos in level.positions() {
            if level.object(pos) == Some(TileObject::Sword) {
                sword = SwordLocation {
                    level: level.number(),
                    x: pos.x,
                    y: pos.y,
                    height: level.height(),
                };
            }
        }
    }
    debug!(end = format_args!("0x{:X}", layout.end()), "tile block written");
    Ok(sword)
}

fn write_category<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    profile: &RegionProfile,
    category: Category,
    levels: &[Level],
) -> Result<(), CoreError> {
    let base = profile.categories.get(category);
    w.seek_to(base)?;

    let mut offset = base + (levels.len() * Category::DIRECTORY_ENTRY_SIZE) as u64;
    for level in levels {
        let count = level.count(category);
        w.write_u16(count as u32)?;
        if count == 0 {
            w.write_u32(0)?;
        } else {
            w.write_u32(offset as u32)?;
            offset += (count * category.record_size()) as u64;
        }
    }

    for level in levels {
        for record in level.records(category) {
            encode_record(w, &record)?;
        }
    }
    debug!(%category, end = format_args!("0x{offset:X}"), "category table written");
    Ok(())
}

/// Encode the whole store over a ROM image.
///
/// The caller is responsible for the quota check and for taking a backup.
pub fn save<W: Write + Seek>(writer: W, store: &LevelStore) -> Result<W, CoreError> {
    let mut w = BigEndianWriter::new(writer);
    let profile = store.profile();
    let levels = store.levels();

    write_prince_table(&mut w, profile, levels)?;

    let counts: Vec<usize> = levels.iter().map(Level::expected_tiles).collect();
    let layout = TileBlockLayout::packed(profile.tile_block, &counts);
    write_level_headers(&mut w, profile, levels, &layout)?;

    let sword = write_planes(&mut w, levels, &layout)?;
    write_sword_patch(&mut w, profile, sword)?;

    for category in Category::ALL {
        write_category(&mut w, profile, category, levels)?;
    }

    w.flush()?;
    info!(region = %store.region(), levels = levels.len(), "ROM saved");
    Ok(w.into_inner())
}
