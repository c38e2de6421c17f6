mod common;

use std::fs;
use std::io::Cursor;

use common::*;
use popmd_core::backup::default_backup_path;
use popmd_core::coords::{RoomPos, TilePos};
use popmd_core::core_api::{CoreErrorCode, Engine, ViewState};
use popmd_core::region::Region;
use popmd_core::settings::{GameSettings, StartOverride, load_settings};
use popmd_core::tile::{LevelType, TileObject};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

#[test]
fn edits_are_counted_until_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pop.bin");
    fs::write(&path, RomBuilder::us().build()).unwrap();

    let mut session = Engine::new().open_path(&path).unwrap();
    assert!(!session.is_modified());
    session.set_tile(1, 2, 1, TileObject::Wall, None).unwrap();
    session.set_level_type(1, LevelType::Palace).unwrap();
    assert_eq!(session.changed(), 2);

    let out = dir.path().join("edited.bin");
    session.save_to(&out).unwrap();
    assert_eq!(session.changed(), 0);

    let reopened = Engine::new().open_path(&out).unwrap();
    assert_eq!(reopened.tile(1, 2, 1).unwrap().object, TileObject::Wall);
    assert_eq!(reopened.level(1).unwrap().level_type(), LevelType::Palace);
}

#[test]
fn failed_edits_do_not_count() {
    let mut session = Engine::new().open_bytes(RomBuilder::us().build()).unwrap();
    assert!(session.set_tile(1, 40, 1, TileObject::Wall, None).is_err());
    assert!(session.set_start_room(1, RoomPos::new(2, 1)).is_err());
    assert_eq!(session.changed(), 0);
}

#[test]
fn save_in_place_keeps_a_backup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pop.bin");
    let original = RomBuilder::eu().build();
    fs::write(&path, &original).unwrap();

    let mut session = Engine::new().open_path(&path).unwrap();
    assert_eq!(session.region(), Region::Eu);
    session.set_tile(3, 4, 2, TileObject::Spike, None).unwrap();
    let backup = session.save_in_place(None).unwrap();

    assert_eq!(backup, default_backup_path(&path));
    assert_eq!(fs::read(&backup).unwrap(), original);
    let saved = Engine::new().open_path(&path).unwrap();
    assert_eq!(saved.level(3).unwrap().spikes().len(), 1);
}

#[test]
fn save_in_place_needs_a_file() {
    let mut session = Engine::new().open_bytes(RomBuilder::us().build()).unwrap();
    let err = session.save_in_place(None).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Engine::new().open_path(dir.path().join("nope.bin")).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Io);
    assert!(err.message.contains("could not open"));
}

#[test]
fn view_is_pulled_back_after_shrinking() {
    let mut session = Engine::new().open_bytes(RomBuilder::us().size(2, 4, 3).build()).unwrap();
    session.set_view(2, 4, 3).unwrap();
    assert!(session.set_view(2, 5, 1).is_err());

    session.resize_level(2, 2, 2).unwrap();
    assert_eq!(
        session.view(),
        ViewState {
            level: 2,
            room_x: 2,
            room_y: 2
        }
    );
}

#[test]
fn reload_discards_every_edit() {
    let rom = RomBuilder::us().tile(1, 5, 2, GATE, 0).gate(1, 5, 2, [0, 0, 0]).build();
    let mut session = Engine::new().open_bytes(rom).unwrap();
    session.set_tile(1, 5, 2, TileObject::Floor, None).unwrap();
    session.set_tile(2, 1, 1, TileObject::Wall, None).unwrap();
    session.set_settings(GameSettings {
        hit_points: 9,
        ..*session.settings()
    });
    assert!(session.level(1).unwrap().gates().is_empty());

    session.reload().unwrap();
    assert_eq!(session.level(1).unwrap().gates().len(), 1);
    assert_eq!(session.tile(2, 1, 1).unwrap().object, TileObject::Floor);
    assert_ne!(session.settings().hit_points, 9);
    assert_eq!(session.changed(), 0);
    assert!(!session.is_modified());
}

#[test]
fn reload_restores_the_single_sword() {
    let rom = RomBuilder::us().tile(1, 1, 1, SWORD, 0).build();
    let mut session = Engine::new().open_bytes(rom).unwrap();
    session.set_tile(2, 1, 1, TileObject::Sword, None).unwrap();
    assert_eq!(session.store().sword_locations(), vec![(2, TilePos::new(1, 1))]);

    session.reload().unwrap();
    assert_eq!(session.store().sword_locations(), vec![(1, TilePos::new(1, 1))]);
    assert_eq!(session.changed(), 0);
}

#[test]
fn reload_clamps_the_view() {
    let mut session = Engine::new().open_bytes(RomBuilder::us().build()).unwrap();
    session.resize_level(3, 4, 2).unwrap();
    session.set_view(3, 4, 2).unwrap();

    session.reload().unwrap();
    assert_eq!(
        session.view(),
        ViewState {
            level: 3,
            room_x: 1,
            room_y: 1
        }
    );
}

#[test]
fn settings_round_trip_through_frames() {
    // 5:00 at 60 frames per second, 3 hit points, level 1.
    let rom = RomBuilder::us().settings(5 * 60 * 60 - 1, 3, 0).build();
    let mut session = Engine::new().open_bytes(rom).unwrap();
    assert_eq!(
        *session.settings(),
        GameSettings {
            minutes: 5,
            seconds: 0,
            hit_points: 3,
            start_level: 1
        }
    );

    session.set_settings(*session.settings());
    assert_eq!(session.changed(), 0);

    session.set_settings(GameSettings {
        minutes: 7,
        seconds: 30,
        hit_points: 5,
        start_level: 4,
    });
    assert_eq!(session.changed(), 1);
    let bytes = session.to_bytes().unwrap();

    let offsets = &RomBuilder::us().profile().settings;
    assert_eq!(dword_at(&bytes, offsets.starting_time), 450 * 60 - 1);
    assert_eq!(bytes[offsets.starting_hit_points as usize], 5);
    assert_eq!(bytes[offsets.starting_level as usize], 3);

    let reread = load_settings(Cursor::new(bytes.as_slice()), RomBuilder::us().profile()).unwrap();
    assert_eq!((reread.minutes, reread.seconds), (7, 30));
}

#[test]
fn eu_time_uses_fifty_frames() {
    let rom = RomBuilder::eu().settings(90 * 50 - 1, 4, 2).build();
    let session = Engine::new().open_bytes(rom).unwrap();
    let settings = session.settings();
    assert_eq!((settings.minutes, settings.seconds), (1, 30));
    assert_eq!(settings.start_level, 3);
}

#[test]
fn untouched_settings_are_not_rewritten() {
    let mut rom = RomBuilder::us().build();
    let offset = RomBuilder::us().profile().settings.starting_time as usize;
    rom[offset..offset + 4].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
    let session = Engine::new().open_bytes(rom).unwrap();
    let bytes = session.to_bytes().unwrap();
    assert_eq!(&bytes[offset..offset + 4], &[0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn start_override_restores_previous_level() {
    let profile = RomBuilder::us().profile();
    let mut rom = Cursor::new(RomBuilder::us().settings(0, 3, 2).build());

    let guard = StartOverride::apply(&mut rom, profile, 9).unwrap();
    assert_eq!(guard.previous(), 3);
    assert_eq!(rom.get_ref()[profile.settings.starting_level as usize], 8);

    guard.restore(&mut rom, profile).unwrap();
    assert_eq!(rom.get_ref()[profile.settings.starting_level as usize], 2);
}

#[test]
fn capabilities_flag_unordered_tables() {
    let rom = RomBuilder::us().spike(1, 6, 1).spike(1, 2, 1).build();
    let session = Engine::new().open_bytes(rom).unwrap();
    let caps = session.capabilities();
    assert!(caps.can_save);
    assert_eq!(
        caps.issues,
        vec![popmd_core::core_api::CapabilityIssue::UnorderedTables]
    );
}

#[test]
fn level_summaries_cover_every_level() {
    let session = Engine::new().open_bytes(RomBuilder::eu().size(4, 2, 3).build()).unwrap();
    let summaries = session.level_summaries();
    assert_eq!(summaries.len(), 17);
    let fourth = &summaries[3];
    assert_eq!((fourth.number, fourth.width, fourth.height, fourth.rooms), (4, 2, 3, 6));
    assert_eq!(fourth.declared_tiles, 180);
    assert_eq!(fourth.counts.len(), 9);
}

#[test]
fn seeded_randomize_keeps_floors_under_space() {
    let mut session = Engine::new().open_bytes(RomBuilder::us().size(2, 3, 2).build()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let written = session.randomize_level(2, &mut rng).unwrap();
    assert_eq!(written, 180);

    let level = session.level(2).unwrap();
    for pos in level.positions() {
        let object = level.object(pos).unwrap();
        assert!(matches!(
            object,
            TileObject::Space | TileObject::Wall | TileObject::Floor
        ));
        if pos.y == level.tile_rows() {
            assert_ne!(object, TileObject::Space, "bottom row at {pos:?}");
        } else if object == TileObject::Space {
            let below = level.object(TilePos::new(pos.x, pos.y + 1)).unwrap();
            assert_ne!(below, TileObject::Wall, "space above wall at {pos:?}");
        }
    }

    let mut again = Engine::new().open_bytes(RomBuilder::us().size(2, 3, 2).build()).unwrap();
    again.randomize_level(2, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(again.level(2).unwrap(), level);
}
