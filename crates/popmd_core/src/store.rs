//! In-memory level model.
//!
//! Tile planes are stored the way the ROM stores them: column by column,
//! `x` outer and `y` inner, one byte per tile. Category tables hold one
//! struct per record. All structural mutation goes through this module and
//! [`crate::editor`], which keep tables ordered and plate references valid.

use tracing::debug;

use crate::category::Category;
use crate::coords::{
    MAX_LEVEL_ROOMS, ROOM_TILE_HEIGHT, ROOM_TILE_WIDTH, RoomPos, TILES_PER_ROOM, TilePos,
};
use crate::core_api::CoreError;
use crate::editor;
use crate::facing::Facing;
use crate::quota::{self, QuotaReport};
use crate::records::{
    Chomper, Door, Gate, Guard, LooseFloor, Plate, Positioned, Potion, PrinceStart, Record, Spike,
};
use crate::region::{Region, RegionProfile};
use crate::table::ObjectTable;
use crate::tile::{LevelType, Tile, TileObject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub(crate) number: usize,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) declared_tiles: u16,
    pub(crate) level_type: LevelType,
    pub(crate) start_room: RoomPos,
    pub(crate) graphics_offset: u32,
    pub(crate) objects_offset: u32,
    pub(crate) objects: Vec<u8>,
    pub(crate) graphics: Vec<u8>,
    pub(crate) prince: PrinceStart,
    pub(crate) guards: ObjectTable<Guard>,
    pub(crate) doors: ObjectTable<Door>,
    pub(crate) gates: ObjectTable<Gate>,
    pub(crate) loose: ObjectTable<LooseFloor>,
    pub(crate) raise: ObjectTable<Plate>,
    pub(crate) drop: ObjectTable<Plate>,
    pub(crate) chompers: ObjectTable<Chomper>,
    pub(crate) spikes: ObjectTable<Spike>,
    pub(crate) potions: ObjectTable<Potion>,
}

impl Level {
    /// Empty level: every tile is space with graphics 0.
    pub fn new(number: usize, width: usize, height: usize, level_type: LevelType) -> Self {
        let tiles = width * height * TILES_PER_ROOM;
        Self {
            number,
            width,
            height,
            declared_tiles: tiles as u16,
            level_type,
            start_room: RoomPos::new(1, 1),
            graphics_offset: 0,
            objects_offset: 0,
            objects: vec![TileObject::Space.raw(); tiles],
            graphics: vec![0; tiles],
            prince: PrinceStart {
                x: 1,
                y: 1,
                facing: Facing::Right,
            },
            guards: ObjectTable::new(),
            doors: ObjectTable::new(),
            gates: ObjectTable::new(),
            loose: ObjectTable::new(),
            raise: ObjectTable::new(),
            drop: ObjectTable::new(),
            chompers: ObjectTable::new(),
            spikes: ObjectTable::new(),
            potions: ObjectTable::new(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    /// Width in rooms.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rooms.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_columns(&self) -> usize {
        self.width * ROOM_TILE_WIDTH
    }

    pub fn tile_rows(&self) -> usize {
        self.height * ROOM_TILE_HEIGHT
    }

    pub fn room_count(&self) -> usize {
        self.width * self.height
    }

    pub fn expected_tiles(&self) -> usize {
        self.room_count() * TILES_PER_ROOM
    }

    pub fn declared_tiles(&self) -> u16 {
        self.declared_tiles
    }

    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    pub fn start_room(&self) -> RoomPos {
        self.start_room
    }

    pub fn prince(&self) -> PrinceStart {
        self.prince
    }

    /// Plane offsets as read from the ROM; saving recomputes them.
    pub fn loaded_offsets(&self) -> (u32, u32) {
        (self.graphics_offset, self.objects_offset)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        (1..=self.tile_columns()).contains(&pos.x) && (1..=self.tile_rows()).contains(&pos.y)
    }

    pub fn contains_room(&self, room: RoomPos) -> bool {
        (1..=self.width).contains(&room.x) && (1..=self.height).contains(&room.y)
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.x - 1) * self.tile_rows() + (pos.y - 1))
    }

    pub fn tile(&self, pos: TilePos) -> Option<Tile> {
        let i = self.index(pos)?;
        Some(Tile {
            object: TileObject::from_raw(self.objects[i]),
            graphics: self.graphics[i],
        })
    }

    pub fn object(&self, pos: TilePos) -> Option<TileObject> {
        self.tile(pos).map(|t| t.object)
    }

    /// Object plane in ROM order.
    pub fn object_plane(&self) -> &[u8] {
        &self.objects
    }

    /// Graphics plane in ROM order.
    pub fn graphics_plane(&self) -> &[u8] {
        &self.graphics
    }

    /// Every tile position in ROM order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + use<> {
        let rows = self.tile_rows();
        (1..=self.tile_columns()).flat_map(move |x| (1..=rows).map(move |y| TilePos::new(x, y)))
    }

    pub fn guards(&self) -> &ObjectTable<Guard> {
        &self.guards
    }

    pub fn doors(&self) -> &ObjectTable<Door> {
        &self.doors
    }

    pub fn gates(&self) -> &ObjectTable<Gate> {
        &self.gates
    }

    pub fn loose(&self) -> &ObjectTable<LooseFloor> {
        &self.loose
    }

    pub fn raise(&self) -> &ObjectTable<Plate> {
        &self.raise
    }

    pub fn drop_plates(&self) -> &ObjectTable<Plate> {
        &self.drop
    }

    pub fn chompers(&self) -> &ObjectTable<Chomper> {
        &self.chompers
    }

    pub fn spikes(&self) -> &ObjectTable<Spike> {
        &self.spikes
    }

    pub fn potions(&self) -> &ObjectTable<Potion> {
        &self.potions
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Guards => self.guards.len(),
            Category::Doors => self.doors.len(),
            Category::Gates => self.gates.len(),
            Category::Loose => self.loose.len(),
            Category::Raise => self.raise.len(),
            Category::Drop => self.drop.len(),
            Category::Chompers => self.chompers.len(),
            Category::Spikes => self.spikes.len(),
            Category::Potions => self.potions.len(),
        }
    }

    /// Records of one category in table order.
    pub fn records(&self, category: Category) -> Vec<Record> {
        match category {
            Category::Guards => self.guards.iter().copied().map(Record::Guard).collect(),
            Category::Doors => self.doors.iter().copied().map(Record::Door).collect(),
            Category::Gates => self.gates.iter().copied().map(Record::Gate).collect(),
            Category::Loose => self.loose.iter().copied().map(Record::Loose).collect(),
            Category::Raise => self.raise.iter().copied().map(Record::Raise).collect(),
            Category::Drop => self.drop.iter().copied().map(Record::Drop).collect(),
            Category::Chompers => self.chompers.iter().copied().map(Record::Chomper).collect(),
            Category::Spikes => self.spikes.iter().copied().map(Record::Spike).collect(),
            Category::Potions => self.potions.iter().copied().map(Record::Potion).collect(),
        }
    }

    pub fn record_at(&self, category: Category, pos: TilePos) -> Option<Record> {
        self.records(category).into_iter().find(|r| r.pos() == pos)
    }

    pub fn is_ordered(&self) -> bool {
        self.guards.is_sorted()
            && self.doors.is_sorted()
            && self.gates.is_sorted()
            && self.loose.is_sorted()
            && self.raise.is_sorted()
            && self.drop.is_sorted()
            && self.chompers.is_sorted()
            && self.spikes.is_sorted()
            && self.potions.is_sorted()
    }

    pub(crate) fn set_object_raw(&mut self, pos: TilePos, raw: u8) {
        if let Some(i) = self.index(pos) {
            self.objects[i] = raw;
        }
    }

    pub(crate) fn set_graphics_raw(&mut self, pos: TilePos, raw: u8) {
        if let Some(i) = self.index(pos) {
            self.graphics[i] = raw;
        }
    }

    /// Reshape both planes, keeping tiles that exist in both sizes.
    pub(crate) fn reshape(&mut self, width: usize, height: usize) {
        let rows = height * ROOM_TILE_HEIGHT;
        let tiles = width * height * TILES_PER_ROOM;
        let mut objects = vec![TileObject::Space.raw(); tiles];
        let mut graphics = vec![0; tiles];

        for pos in self.positions() {
            if pos.x > width * ROOM_TILE_WIDTH || pos.y > rows {
                continue;
            }
            if let Some(old) = self.index(pos) {
                let new = (pos.x - 1) * rows + (pos.y - 1);
                objects[new] = self.objects[old];
                graphics[new] = self.graphics[old];
            }
        }

        self.width = width;
        self.height = height;
        self.objects = objects;
        self.graphics = graphics;
        self.declared_tiles = tiles as u16;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStore {
    region: Region,
    levels: Vec<Level>,
}

impl LevelStore {
    pub fn new(region: Region, levels: Vec<Level>) -> Self {
        Self { region, levels }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn profile(&self) -> &'static RegionProfile {
        self.region.profile()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, number: usize) -> Option<&Level> {
        number.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub(crate) fn checked_level(&self, number: usize) -> Result<&Level, CoreError> {
        self.level(number).ok_or_else(|| {
            CoreError::invalid_input(format!(
                "level {number} out of range 1-{}",
                self.levels.len()
            ))
        })
    }

    pub(crate) fn level_mut(&mut self, number: usize) -> Result<&mut Level, CoreError> {
        let count = self.levels.len();
        number
            .checked_sub(1)
            .and_then(|i| self.levels.get_mut(i))
            .ok_or_else(|| CoreError::invalid_input(format!("level {number} out of range 1-{count}")))
    }

    pub(crate) fn checked_pos(&self, number: usize, pos: TilePos) -> Result<&Level, CoreError> {
        let level = self.checked_level(number)?;
        if !level.contains(pos) {
            return Err(CoreError::invalid_input(format!(
                "tile ({}, {}) outside level {number} ({}x{} tiles)",
                pos.x,
                pos.y,
                level.tile_columns(),
                level.tile_rows()
            )));
        }
        Ok(level)
    }

    pub fn object_at(&self, level: usize, x: usize, y: usize) -> Result<Tile, CoreError> {
        let pos = TilePos::new(x, y);
        let level = self.checked_pos(level, pos)?;
        level
            .tile(pos)
            .ok_or_else(|| CoreError::invalid_input(format!("tile ({x}, {y}) out of range")))
    }

    /// Replace a tile's object and, unless `graphics` is `None`, its graphics.
    ///
    /// The old object's category record is removed and a default record for
    /// the new object's category is inserted. Placing a sword turns every
    /// other sword in the game into floor.
    pub fn set_tile(
        &mut self,
        level: usize,
        x: usize,
        y: usize,
        object: TileObject,
        graphics: Option<u8>,
    ) -> Result<(), CoreError> {
        let pos = TilePos::new(x, y);
        let old = self
            .checked_pos(level, pos)?
            .object(pos)
            .unwrap_or(TileObject::Space);
        let profile = self.profile();

        self.level_mut(level)?.set_object_raw(pos, object.raw());
        if object == TileObject::Sword {
            self.keep_single_sword(level, pos);
        }

        let lvl = self.level_mut(level)?;
        if let Some(category) = Category::for_object(old) {
            editor::remove_record(lvl, category, pos);
        }
        if let Some(category) = Category::for_object(object) {
            editor::insert_record(lvl, Record::default_for(category, pos, profile));
        }
        if let Some(graphics) = graphics {
            lvl.set_graphics_raw(pos, graphics);
        }
        Ok(())
    }

    fn keep_single_sword(&mut self, level: usize, pos: TilePos) {
        for lvl in &mut self.levels {
            let this_level = lvl.number == level;
            let rows = lvl.tile_rows();
            for (i, raw) in lvl.objects.iter_mut().enumerate() {
                if *raw != TileObject::Sword.raw() {
                    continue;
                }
                let at = TilePos::new(i / rows + 1, i % rows + 1);
                if this_level && at == pos {
                    continue;
                }
                debug!(
                    level = lvl.number,
                    x = at.x,
                    y = at.y,
                    "removing duplicate sword"
                );
                *raw = TileObject::Floor.raw();
            }
        }
    }

    /// Ordered records of one category.
    pub fn attribute_table(&self, level: usize, category: Category) -> Result<Vec<Record>, CoreError> {
        Ok(self.checked_level(level)?.records(category))
    }

    /// Every sword tile in the game as (level, position).
    pub fn sword_locations(&self) -> Vec<(usize, TilePos)> {
        self.levels
            .iter()
            .flat_map(|lvl| {
                lvl.positions()
                    .filter(|&pos| lvl.object(pos) == Some(TileObject::Sword))
                    .map(|pos| (lvl.number, pos))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Change a level's size in rooms.
    ///
    /// Rooms that fall outside the new bounds are cleared first, then any
    /// record still positioned outside is dropped, then the planes are
    /// reshaped. Growing fills new tiles with space.
    pub fn resize(&mut self, level: usize, width: usize, height: usize) -> Result<(), CoreError> {
        let bounds = 1..=MAX_LEVEL_ROOMS;
        if !bounds.contains(&width) || !bounds.contains(&height) {
            return Err(CoreError::invalid_input(format!(
                "level size must be 1-{MAX_LEVEL_ROOMS} rooms each way, got {width}x{height}"
            )));
        }
        let (old_width, old_height) = {
            let lvl = self.checked_level(level)?;
            (lvl.width, lvl.height)
        };
        if (old_width, old_height) == (width, height) {
            return Ok(());
        }

        for rx in 1..=old_width {
            for ry in 1..=old_height {
                if rx > width || ry > height {
                    editor::clear_room(self, level, RoomPos::new(rx, ry))?;
                }
            }
        }

        let lvl = self.level_mut(level)?;
        let columns = width * ROOM_TILE_WIDTH;
        let rows = height * ROOM_TILE_HEIGHT;
        let outside = |pos: TilePos| pos.x > columns || pos.y > rows;
        for category in Category::ALL {
            let stray: Vec<TilePos> = lvl
                .records(category)
                .iter()
                .map(Positioned::pos)
                .filter(|&pos| outside(pos))
                .collect();
            for pos in stray {
                editor::remove_record(lvl, category, pos);
            }
        }

        lvl.reshape(width, height);
        debug!(level, old_width, old_height, width, height, "level resized");
        Ok(())
    }

    pub fn set_level_type(&mut self, level: usize, level_type: LevelType) -> Result<(), CoreError> {
        self.level_mut(level)?.level_type = level_type;
        Ok(())
    }

    pub fn set_start_room(&mut self, level: usize, room: RoomPos) -> Result<(), CoreError> {
        let lvl = self.level_mut(level)?;
        if !lvl.contains_room(room) {
            return Err(CoreError::invalid_input(format!(
                "room ({}, {}) outside level {level} ({}x{} rooms)",
                room.x, room.y, lvl.width, lvl.height
            )));
        }
        lvl.start_room = room;
        Ok(())
    }

    pub fn total_rooms(&self) -> usize {
        self.levels.iter().map(Level::room_count).sum()
    }

    pub fn total(&self, category: Category) -> usize {
        self.levels.iter().map(|lvl| lvl.count(category)).sum()
    }

    pub fn quota_report(&self) -> QuotaReport {
        quota::quota_report(self)
    }

    pub fn is_saving_allowed(&self) -> bool {
        self.quota_report().all_ok()
    }
}
