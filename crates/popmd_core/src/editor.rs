//! Ordered insert/remove on category tables and the edits built on them.
//!
//! Plates point at gates by ordinal, so every gate insert or removal shifts
//! the plate references of the same level.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::category::Category;
use crate::coords::{RoomPos, TilePos};
use crate::core_api::CoreError;
use crate::facing::Facing;
use crate::records::{DoorKind, GateRef, Guard, GuardKind, Positioned, Record};
use crate::store::{Level, LevelStore};
use crate::tile::TileObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateShift {
    Inserted(usize),
    Removed(usize),
}

/// Insert a record at its ordered position and return its ordinal.
pub fn insert_record(level: &mut Level, record: Record) -> usize {
    let ordinal = match record {
        Record::Guard(r) => level.guards.insert(r),
        Record::Door(r) => level.doors.insert(r),
        Record::Gate(r) => level.gates.insert(r),
        Record::Loose(r) => level.loose.insert(r),
        Record::Raise(r) => level.raise.insert(r),
        Record::Drop(r) => level.drop.insert(r),
        Record::Chomper(r) => level.chompers.insert(r),
        Record::Spike(r) => level.spikes.insert(r),
        Record::Potion(r) => level.potions.insert(r),
    };
    if let Record::Gate(_) = record {
        shift_gate_refs(level, GateShift::Inserted(ordinal));
    }
    trace!(level = level.number, category = %record.category(), ordinal, "record inserted");
    ordinal
}

/// Remove the first record of `category` at `pos`.
pub fn remove_record(level: &mut Level, category: Category, pos: TilePos) -> Option<Record> {
    let (ordinal, record) = match category {
        Category::Guards => level.guards.remove(pos).map(|(o, r)| (o, Record::Guard(r))),
        Category::Doors => level.doors.remove(pos).map(|(o, r)| (o, Record::Door(r))),
        Category::Gates => level.gates.remove(pos).map(|(o, r)| (o, Record::Gate(r))),
        Category::Loose => level.loose.remove(pos).map(|(o, r)| (o, Record::Loose(r))),
        Category::Raise => level.raise.remove(pos).map(|(o, r)| (o, Record::Raise(r))),
        Category::Drop => level.drop.remove(pos).map(|(o, r)| (o, Record::Drop(r))),
        Category::Chompers => level
            .chompers
            .remove(pos)
            .map(|(o, r)| (o, Record::Chomper(r))),
        Category::Spikes => level.spikes.remove(pos).map(|(o, r)| (o, Record::Spike(r))),
        Category::Potions => level
            .potions
            .remove(pos)
            .map(|(o, r)| (o, Record::Potion(r))),
    }?;
    if category == Category::Gates {
        shift_gate_refs(level, GateShift::Removed(ordinal));
    }
    trace!(level = level.number, %category, ordinal, "record removed");
    Some(record)
}

/// Keep plate references pointing at the same gates after a table change.
///
/// A reference to a removed gate is left untouched.
pub fn shift_gate_refs(level: &mut Level, shift: GateShift) {
    let plates = level.raise.iter_mut().chain(level.drop.iter_mut());
    for plate in plates {
        for gate in &mut plate.gates {
            let GateRef::Gate(ordinal) = gate else {
                continue;
            };
            match shift {
                GateShift::Inserted(at) if *ordinal as usize >= at => *ordinal += 1,
                GateShift::Removed(at) if *ordinal as usize > at => *ordinal -= 1,
                _ => {}
            }
        }
    }
}

/// Blank every tile of a room and remove the guards standing in it.
pub fn clear_room(store: &mut LevelStore, level: usize, room: RoomPos) -> Result<(), CoreError> {
    let lvl = store.checked_level(level)?;
    if !lvl.contains_room(room) {
        return Err(CoreError::invalid_input(format!(
            "room ({}, {}) outside level {level}",
            room.x, room.y
        )));
    }
    for pos in room.tiles() {
        store.set_tile(level, pos.x, pos.y, TileObject::Space, Some(0))?;
        remove_record(store.level_mut(level)?, Category::Guards, pos);
    }
    Ok(())
}

/// Overwrite the record at `record`'s position with new field values.
pub fn fill_record(store: &mut LevelStore, level: usize, record: Record) -> Result<(), CoreError> {
    let pos = record.pos();
    let lvl = store.level_mut(level)?;
    let slot_found = match record {
        Record::Guard(r) => lvl.guards.find_mut(pos).map(|slot| *slot = r),
        Record::Door(r) => lvl.doors.find_mut(pos).map(|slot| *slot = r),
        Record::Gate(r) => lvl.gates.find_mut(pos).map(|slot| *slot = r),
        Record::Loose(r) => lvl.loose.find_mut(pos).map(|slot| *slot = r),
        Record::Raise(r) => lvl.raise.find_mut(pos).map(|slot| *slot = r),
        Record::Drop(r) => lvl.drop.find_mut(pos).map(|slot| *slot = r),
        Record::Chomper(r) => lvl.chompers.find_mut(pos).map(|slot| *slot = r),
        Record::Spike(r) => lvl.spikes.find_mut(pos).map(|slot| *slot = r),
        Record::Potion(r) => lvl.potions.find_mut(pos).map(|slot| *slot = r),
    };
    slot_found.ok_or_else(|| missing(record.category(), level, pos))
}

fn missing(category: Category, level: usize, pos: TilePos) -> CoreError {
    CoreError::invalid_input(format!(
        "no {category} record at ({}, {}) in level {level}",
        pos.x, pos.y
    ))
}

/// Set a gate's three state words: state, openness and delay (stored ×257).
pub fn set_gate_attributes(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    state: u16,
    openness: u16,
    delay: u16,
) -> Result<(), CoreError> {
    let gate = store
        .level_mut(level)?
        .gates
        .find_mut(pos)
        .ok_or_else(|| missing(Category::Gates, level, pos))?;
    gate.state1 = state;
    gate.state2 = openness;
    gate.state3 = delay.wrapping_mul(257);
    Ok(())
}

/// Set the three gate references of the raise or drop plate at `pos`.
pub fn set_plate_gates(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    gates: [GateRef; 3],
) -> Result<(), CoreError> {
    let lvl = store.level_mut(level)?;
    let plate = match lvl.object(pos) {
        Some(TileObject::Drop) => lvl.drop.find_mut(pos),
        _ => lvl.raise.find_mut(pos),
    };
    let plate = plate.ok_or_else(|| missing(Category::Raise, level, pos))?;
    plate.gates = gates;
    Ok(())
}

pub fn set_potion(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    color: u16,
    effect: u16,
) -> Result<(), CoreError> {
    let potion = store
        .level_mut(level)?
        .potions
        .find_mut(pos)
        .ok_or_else(|| missing(Category::Potions, level, pos))?;
    potion.color = color;
    potion.effect = effect;
    Ok(())
}

pub fn set_door_kind(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    kind: DoorKind,
) -> Result<(), CoreError> {
    let door = store
        .level_mut(level)?
        .doors
        .find_mut(pos)
        .ok_or_else(|| missing(Category::Doors, level, pos))?;
    door.kind = kind;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardToggle {
    Added,
    Replaced,
    Removed,
}

/// Guard placement as a toggle: the same kind and facing removes the guard,
/// anything else replaces it, an empty tile gets a new guard.
pub fn toggle_guard(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    kind: GuardKind,
    facing: Facing,
    skill: u32,
    hit_points: u32,
) -> Result<GuardToggle, CoreError> {
    store.checked_pos(level, pos)?;
    let profile = store.profile();
    let lvl = store.level_mut(level)?;

    let existing = lvl.guards.find(pos).map(|g| (g.kind, g.facing));
    let outcome = match existing {
        Some(found) if found == (kind, facing) => {
            remove_record(lvl, Category::Guards, pos);
            return Ok(GuardToggle::Removed);
        }
        Some(_) => {
            remove_record(lvl, Category::Guards, pos);
            GuardToggle::Replaced
        }
        None => GuardToggle::Added,
    };

    let guard = Guard::new(pos, kind, facing, skill, hit_points, profile);
    insert_record(lvl, Record::Guard(guard));
    Ok(outcome)
}

pub fn set_guard_skill_hp(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    skill: u32,
    hit_points: u32,
) -> Result<(), CoreError> {
    let guard = store
        .level_mut(level)?
        .guards
        .find_mut(pos)
        .ok_or_else(|| missing(Category::Guards, level, pos))?;
    guard.skill = skill;
    guard.hit_points = hit_points;
    Ok(())
}

/// Put an object on a tile and, if given, fill its category record.
///
/// This is `set_tile` followed by [`fill_record`]; the record's own
/// position is ignored in favour of `pos`.
pub fn place_object(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    object: TileObject,
    graphics: Option<u8>,
    attributes: Option<Record>,
) -> Result<(), CoreError> {
    store.set_tile(level, pos.x, pos.y, object, graphics)?;
    let Some(record) = attributes else {
        return Ok(());
    };
    if Category::for_object(object) != Some(record.category()) {
        return Err(CoreError::invalid_input(format!(
            "{} attributes do not fit a {} tile",
            record.category(),
            object.code()
        )));
    }
    fill_record(store, level, record.moved_to(pos))
}

/// Move the prince start and make the room containing it the start room.
pub fn place_prince(
    store: &mut LevelStore,
    level: usize,
    pos: TilePos,
    facing: Facing,
) -> Result<(), CoreError> {
    store.checked_pos(level, pos)?;
    let lvl = store.level_mut(level)?;
    lvl.prince.x = pos.x;
    lvl.prince.y = pos.y;
    lvl.prince.facing = facing;
    lvl.start_room = pos.room();
    Ok(())
}
