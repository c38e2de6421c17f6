//! ROM → [`LevelStore`] decoding.
//!
//! Fatal problems (unreadable bytes, wrong ROM, unknown region) abort with
//! an error. Structural oddities are logged as warnings and the data is used
//! as read.

use std::io::{Read, Seek};

use tracing::{debug, info, warn};

use crate::category::Category;
use crate::codec::BigEndianReader;
use crate::coords::{RoomPos, TILES_PER_ROOM, load_room_x, load_room_y, load_x, load_y_bottom};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::facing::Facing;
use crate::layout::TileBlockLayout;
use crate::record_codec::decode_record;
use crate::records::{PrinceStart, Record};
use crate::region::{REGION_OFFSET, Region, RegionProfile, VERIFY_OFFSETS, VERIFY_TEXT, detect_region};
use crate::store::{Level, LevelStore};
use crate::tile::LevelType;

/// Check the verification text and read the region marker.
pub fn read_region<R: Read + Seek>(r: &mut BigEndianReader<R>) -> Result<Region, CoreError> {
    let mut verified = false;
    for offset in VERIFY_OFFSETS {
        let text = r.read_bytes_at(offset, VERIFY_TEXT.len())?;
        if text.to_ascii_uppercase() == VERIFY_TEXT {
            verified = true;
            break;
        }
    }
    if !verified {
        return Err(CoreError::new(
            CoreErrorCode::NotARom,
            "file is not a Prince of Persia for MD ROM",
        ));
    }

    let region = detect_region(r.read_u8_at(REGION_OFFSET)?)?;
    debug!(%region, "region detected");
    Ok(region)
}

#[derive(Debug, Clone, Copy)]
struct LevelHeader {
    height: usize,
    width: usize,
    tiles: u16,
    graphics_offset: u32,
    objects_offset: u32,
    start_room: RoomPos,
    level_type: LevelType,
}

fn read_prince_table<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    profile: &RegionProfile,
) -> Result<Vec<PrinceStart>, CoreError> {
    r.seek_to(profile.prince_table)?;
    let mut out = Vec::with_capacity(profile.level_count);
    for _ in 0..profile.level_count {
        let y = load_y_bottom(r.read_u16()?);
        let x = load_x(r.read_u16()?);
        let facing = Facing::from_raw(r.read_u16()?);
        out.push(PrinceStart { x, y, facing });
    }
    Ok(out)
}

fn read_level_headers<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    profile: &RegionProfile,
) -> Result<Vec<LevelHeader>, CoreError> {
    r.seek_to(profile.level_table)?;
    let mut out = Vec::with_capacity(profile.level_count);
    for index in 0..profile.level_count {
        let level = index + 1;
        let height = r.read_u16()? as usize / 192;
        let width = r.read_u16()? as usize / 320;
        let tiles = r.read_u16()?;
        let graphics_offset = r.read_u32()?;
        let objects_offset = r.read_u32()?;
        let start_y = load_room_y(r.read_u16()?);
        let start_x = load_room_x(r.read_u16()?);
        let level_type = LevelType::from_raw(r.read_u16()?);

        if tiles as usize != width * height * TILES_PER_ROOM {
            warn!(
                level,
                declared = tiles,
                expected = width * height * TILES_PER_ROOM,
                "incorrect number of tiles"
            );
        }
        debug!(level, width, height, %level_type, "level header");

        out.push(LevelHeader {
            height,
            width,
            tiles,
            graphics_offset,
            objects_offset,
            start_room: RoomPos::new(start_x, start_y),
            level_type,
        });
    }
    Ok(out)
}

fn read_level<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    number: usize,
    header: &LevelHeader,
    prince: PrinceStart,
) -> Result<Level, CoreError> {
    let mut level = Level::new(number, header.width, header.height, header.level_type);
    level.declared_tiles = header.tiles;
    level.start_room = header.start_room;
    level.graphics_offset = header.graphics_offset;
    level.objects_offset = header.objects_offset;
    level.prince = prince;

    let tiles = level.expected_tiles();
    level.objects = r.read_bytes_at(header.objects_offset as u64, tiles)?;
    level.graphics = r.read_bytes_at(header.graphics_offset as u64, tiles)?;
    if tiles != header.tiles as usize {
        warn!(
            level = number,
            read = tiles,
            declared = header.tiles,
            "incorrect number of objects and graphics"
        );
    }
    Ok(level)
}

fn read_category<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    profile: &RegionProfile,
    category: Category,
    levels: &mut [Level],
) -> Result<(), CoreError> {
    let base = profile.categories.get(category);
    r.seek_to(base)?;

    let mut counts = Vec::with_capacity(levels.len());
    for level in 1..=levels.len() {
        let count = r.read_u16()? as usize;
        let offset = r.read_u32()?;
        if count > 0 {
            debug!(
                %category,
                level,
                start = format_args!("0x{offset:X}"),
                end = format_args!("0x{:X}", offset as usize + count * category.record_size() - 1),
                "directory entry"
            );
        } else {
            debug!(%category, level, "directory entry (none)");
        }
        counts.push(count);
    }

    // Stored offsets are informational; records follow the directory.
    for (level, count) in levels.iter_mut().zip(counts) {
        for _ in 0..count {
            let record = decode_record(r, category, level.number)?;
            append_loaded(level, record);
        }
    }
    Ok(())
}

/// Records keep their file order on load.
fn append_loaded(level: &mut Level, record: Record) {
    match record {
        Record::Guard(g) => level.guards.push(g),
        Record::Door(d) => level.doors.push(d),
        Record::Gate(g) => level.gates.push(g),
        Record::Loose(l) => level.loose.push(l),
        Record::Raise(p) => level.raise.push(p),
        Record::Drop(p) => level.drop.push(p),
        Record::Chomper(c) => level.chompers.push(c),
        Record::Spike(s) => level.spikes.push(s),
        Record::Potion(p) => level.potions.push(p),
    }
}

fn check_plane_layout(profile: &RegionProfile, levels: &[Level]) {
    let counts: Vec<usize> = levels.iter().map(Level::expected_tiles).collect();
    let packed = TileBlockLayout::packed(profile.tile_block, &counts);
    for level in levels {
        let (graphics, objects) = level.loaded_offsets();
        let expected = (
            packed.graphics(level.number).map(|r| r.start),
            packed.objects(level.number).map(|r| r.start),
        );
        if expected != (Some(graphics as u64), Some(objects as u64)) {
            debug!(
                level = level.number,
                graphics = format_args!("0x{graphics:X}"),
                objects = format_args!("0x{objects:X}"),
                "planes are not packed; saving will repack them"
            );
        }
    }
}

/// Decode every level of a ROM image.
pub fn load<R: Read + Seek>(reader: R) -> Result<LevelStore, CoreError> {
    let mut r = BigEndianReader::new(reader);
    let region = read_region(&mut r)?;
    let profile = region.profile();

    let princes = read_prince_table(&mut r, profile)?;
    let headers = read_level_headers(&mut r, profile)?;

    let mut levels = Vec::with_capacity(profile.level_count);
    for (index, (header, prince)) in headers.iter().zip(princes).enumerate() {
        levels.push(read_level(&mut r, index + 1, header, prince)?);
    }
    check_plane_layout(profile, &levels);

    for category in Category::ALL {
        read_category(&mut r, profile, category, &mut levels)?;
    }

    for level in &levels {
        if !level.is_ordered() {
            debug!(level = level.number, "category tables are not in (x, y) order");
        }
    }

    info!(%region, levels = levels.len(), "ROM loaded");
    Ok(LevelStore::new(region, levels))
}
