use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};

use crate::backup::{create_backup, default_backup_path};
use crate::category::Category;
use crate::coords::{RoomPos, TilePos};
use crate::editor::{self, GuardToggle};
use crate::facing::Facing;
use crate::loader;
use crate::quota::QuotaReport;
use crate::randomize;
use crate::records::{DoorKind, GateRef, GuardKind, Record};
use crate::region::Region;
use crate::saver;
use crate::settings::{self, GameSettings};
use crate::store::{Level, LevelStore};
use crate::tile::{LevelType, Tile, TileObject};

use super::error::{CoreError, CoreErrorCode};
use super::types::{Capabilities, CapabilityIssue, LevelSummary, ViewState};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// An opened ROM with its decoded levels and pending edits.
#[derive(Debug)]
pub struct Session {
    rom: Vec<u8>,
    path: Option<PathBuf>,
    store: LevelStore,
    settings: GameSettings,
    settings_dirty: bool,
    view: ViewState,
    changed: u32,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: Into<Vec<u8>>>(&self, bytes: B) -> Result<Session, CoreError> {
        let rom = bytes.into();
        let store = loader::load(Cursor::new(rom.as_slice()))?;
        let settings = settings::load_settings(Cursor::new(rom.as_slice()), store.profile())?;
        Ok(Session {
            rom,
            path: None,
            store,
            settings,
            settings_dirty: false,
            view: ViewState::default(),
            changed: 0,
        })
    }

    pub fn open_path(&self, path: impl AsRef<Path>) -> Result<Session, CoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("could not open \"{}\": {e}", path.display()),
            )
        })?;
        let mut session = self.open_bytes(bytes)?;
        session.path = Some(path.to_path_buf());
        Ok(session)
    }
}

impl Session {
    pub fn region(&self) -> Region {
        self.store.region()
    }

    pub fn store(&self) -> &LevelStore {
        &self.store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn level(&self, number: usize) -> Result<&Level, CoreError> {
        self.store.checked_level(number)
    }

    pub fn level_summaries(&self) -> Vec<LevelSummary> {
        self.store.levels().iter().map(LevelSummary::of).collect()
    }

    pub fn tile(&self, level: usize, x: usize, y: usize) -> Result<Tile, CoreError> {
        self.store.object_at(level, x, y)
    }

    pub fn records(&self, level: usize, category: Category) -> Result<Vec<Record>, CoreError> {
        self.store.attribute_table(level, category)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Number of edits since the ROM was opened or last saved.
    pub fn changed(&self) -> u32 {
        self.changed
    }

    pub fn is_modified(&self) -> bool {
        self.changed > 0
    }

    pub fn quota_report(&self) -> QuotaReport {
        self.store.quota_report()
    }

    pub fn is_saving_allowed(&self) -> bool {
        self.store.is_saving_allowed()
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut issues = Vec::new();
        if !self.store.is_saving_allowed() {
            issues.push(CapabilityIssue::QuotaExceeded);
        }
        let levels = self.store.levels();
        if levels
            .iter()
            .any(|lvl| lvl.declared_tiles() as usize != lvl.expected_tiles())
        {
            issues.push(CapabilityIssue::TileCountMismatch);
        }
        if levels.iter().any(|lvl| !lvl.is_ordered()) {
            issues.push(CapabilityIssue::UnorderedTables);
        }
        Capabilities::from_issues(issues)
    }

    pub fn set_view(&mut self, level: usize, room_x: usize, room_y: usize) -> Result<(), CoreError> {
        let lvl = self.store.checked_level(level)?;
        if !lvl.contains_room(RoomPos::new(room_x, room_y)) {
            return Err(CoreError::invalid_input(format!(
                "room ({room_x}, {room_y}) outside level {level} ({}x{} rooms)",
                lvl.width(),
                lvl.height()
            )));
        }
        self.view = ViewState {
            level,
            room_x,
            room_y,
        };
        Ok(())
    }

    fn clamp_view(&mut self) {
        if let Some(lvl) = self.store.level(self.view.level) {
            self.view.room_x = self.view.room_x.clamp(1, lvl.width().max(1));
            self.view.room_y = self.view.room_y.clamp(1, lvl.height().max(1));
        }
    }

    fn touch(&mut self) {
        self.changed += 1;
    }

    pub fn set_tile(
        &mut self,
        level: usize,
        x: usize,
        y: usize,
        object: TileObject,
        graphics: Option<u8>,
    ) -> Result<(), CoreError> {
        self.store.set_tile(level, x, y, object, graphics)?;
        self.touch();
        Ok(())
    }

    pub fn place_object(
        &mut self,
        level: usize,
        pos: TilePos,
        object: TileObject,
        graphics: Option<u8>,
        attributes: Option<Record>,
    ) -> Result<(), CoreError> {
        editor::place_object(&mut self.store, level, pos, object, graphics, attributes)?;
        self.touch();
        Ok(())
    }

    /// Resize a level; the view is pulled back inside the new bounds.
    pub fn resize_level(&mut self, level: usize, width: usize, height: usize) -> Result<(), CoreError> {
        self.store.resize(level, width, height)?;
        if self.view.level == level {
            self.clamp_view();
        }
        self.touch();
        Ok(())
    }

    pub fn clear_room(&mut self, level: usize, room: RoomPos) -> Result<(), CoreError> {
        editor::clear_room(&mut self.store, level, room)?;
        self.touch();
        Ok(())
    }

    pub fn set_gate_attributes(
        &mut self,
        level: usize,
        pos: TilePos,
        state: u16,
        openness: u16,
        delay: u16,
    ) -> Result<(), CoreError> {
        editor::set_gate_attributes(&mut self.store, level, pos, state, openness, delay)?;
        self.touch();
        Ok(())
    }

    pub fn set_plate_gates(&mut self, level: usize, pos: TilePos, gates: [GateRef; 3]) -> Result<(), CoreError> {
        editor::set_plate_gates(&mut self.store, level, pos, gates)?;
        self.touch();
        Ok(())
    }

    pub fn set_potion(&mut self, level: usize, pos: TilePos, color: u16, effect: u16) -> Result<(), CoreError> {
        editor::set_potion(&mut self.store, level, pos, color, effect)?;
        self.touch();
        Ok(())
    }

    pub fn set_door_kind(&mut self, level: usize, pos: TilePos, kind: DoorKind) -> Result<(), CoreError> {
        editor::set_door_kind(&mut self.store, level, pos, kind)?;
        self.touch();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn toggle_guard(
        &mut self,
        level: usize,
        pos: TilePos,
        kind: GuardKind,
        facing: Facing,
        skill: u32,
        hit_points: u32,
    ) -> Result<GuardToggle, CoreError> {
        let outcome = editor::toggle_guard(&mut self.store, level, pos, kind, facing, skill, hit_points)?;
        self.touch();
        Ok(outcome)
    }

    pub fn set_guard_skill_hp(
        &mut self,
        level: usize,
        pos: TilePos,
        skill: u32,
        hit_points: u32,
    ) -> Result<(), CoreError> {
        editor::set_guard_skill_hp(&mut self.store, level, pos, skill, hit_points)?;
        self.touch();
        Ok(())
    }

    pub fn place_prince(&mut self, level: usize, pos: TilePos, facing: Facing) -> Result<(), CoreError> {
        editor::place_prince(&mut self.store, level, pos, facing)?;
        self.touch();
        Ok(())
    }

    pub fn set_level_type(&mut self, level: usize, level_type: LevelType) -> Result<(), CoreError> {
        self.store.set_level_type(level, level_type)?;
        self.touch();
        Ok(())
    }

    pub fn set_start_room(&mut self, level: usize, room: RoomPos) -> Result<(), CoreError> {
        self.store.set_start_room(level, room)?;
        self.touch();
        Ok(())
    }

    pub fn randomize_level<R: Rng>(&mut self, level: usize, rng: &mut R) -> Result<usize, CoreError> {
        let written = randomize::randomize_level(&mut self.store, level, rng)?;
        self.touch();
        Ok(written)
    }

    pub fn set_settings(&mut self, settings: GameSettings) {
        if settings != self.settings {
            self.settings = settings;
            self.settings_dirty = true;
            self.touch();
        }
    }

    /// Discard every pending edit by decoding the whole ROM image again.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        let store = loader::load(Cursor::new(self.rom.as_slice()))?;
        let settings = settings::load_settings(Cursor::new(self.rom.as_slice()), store.profile())?;
        self.store = store;
        self.settings = settings;
        self.settings_dirty = false;
        self.changed = 0;
        self.clamp_view();
        debug!(level = self.view.level, "edits discarded, levels reloaded from ROM image");
        Ok(())
    }

    /// Encode the session into a complete ROM image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        if !self.store.is_saving_allowed() {
            let over: Vec<String> = self
                .store
                .quota_report()
                .exceeded()
                .map(|line| format!("{} {}/{}", line.item.as_str(), line.used, line.allowed))
                .collect();
            return Err(CoreError::new(
                CoreErrorCode::QuotaExceeded,
                format!("saving is not allowed, over the limit: {}", over.join(", ")),
            ));
        }

        let cursor = saver::save(Cursor::new(self.rom.clone()), &self.store)?;
        let cursor = if self.settings_dirty {
            settings::save_settings(cursor, self.store.profile(), &self.settings)?
        } else {
            cursor
        };
        Ok(cursor.into_inner())
    }

    /// Write the edited ROM to `path`; the session now tracks that image.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("could not write \"{}\": {e}", path.display()),
            )
        })?;
        self.commit(bytes);
        info!(path = %path.display(), "ROM written");
        Ok(())
    }

    /// Back up the opened file, then overwrite it. Returns the backup path.
    pub fn save_in_place(&mut self, backup: Option<&Path>) -> Result<PathBuf, CoreError> {
        let Some(path) = self.path.clone() else {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                "session was not opened from a file",
            ));
        };
        let bytes = self.to_bytes()?;
        let backup = backup.map_or_else(|| default_backup_path(&path), Path::to_path_buf);
        create_backup(&path, &backup)?;
        fs::write(&path, &bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("could not write \"{}\": {e}", path.display()),
            )
        })?;
        self.commit(bytes);
        info!(path = %path.display(), backup = %backup.display(), "ROM saved in place");
        Ok(backup)
    }

    fn commit(&mut self, bytes: Vec<u8>) {
        self.rom = bytes;
        self.settings_dirty = false;
        self.changed = 0;
    }
}
