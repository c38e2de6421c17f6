use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use popmd_core::core_api::Engine;
use popmd_core::facing::Facing;
use popmd_core::region::{REGION_OFFSET, Region, VERIFY_TEXT};
use popmd_core::saver::save;
use popmd_core::store::{Level, LevelStore};
use popmd_core::tile::{LevelType, TileObject};
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_popmd"))
        .args(args)
        .output()
        .expect("failed to run popmd CLI")
}

/// Blank US ROM, every level one room of floor.
fn write_rom(dir: &Path) -> PathBuf {
    let region = Region::Us;
    let levels = (1..=region.profile().level_count)
        .map(|n| Level::new(n, 1, 1, LevelType::Dungeon))
        .collect();
    let mut store = LevelStore::new(region, levels);
    for level in 1..=region.profile().level_count {
        for x in 1..=10 {
            for y in 1..=3 {
                store.set_tile(level, x, y, TileObject::Floor, None).unwrap();
            }
        }
    }

    let mut image = vec![0u8; 0x30000];
    image[0x150..0x160].copy_from_slice(VERIFY_TEXT);
    image[REGION_OFFSET as usize] = region.marker();
    let bytes = save(Cursor::new(image), &store).unwrap().into_inner();

    let path = dir.join("pop_us.bin");
    fs::write(&path, bytes).unwrap();
    path
}

fn s(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn edits_without_output_are_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let output = run_cli(&["--set-tile", "2,1,wal", &s(&rom)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("require --output"));
}

#[test]
fn output_without_edits_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");
    let output = run_cli(&["--output", &s(&out), &s(&rom)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn set_tile_writes_a_new_rom() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let original = fs::read(&rom).unwrap();
    let out = dir.path().join("out.bin");

    let output = run_cli(&[
        "--level",
        "3",
        "--set-tile",
        "2,1,wal,0x65",
        "--set-tile",
        "4,3,gate",
        "--set-gate",
        "4,3,3,12,1",
        "--output",
        &s(&out),
        &s(&rom),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("Wrote edited ROM to {}", out.display()));

    assert_eq!(fs::read(&rom).unwrap(), original);
    let session = Engine::new().open_path(&out).unwrap();
    let tile = session.tile(3, 2, 1).unwrap();
    assert_eq!((tile.object, tile.graphics), (TileObject::Wall, 0x65));
    let gate = *session.level(3).unwrap().gates().get(1).unwrap();
    assert_eq!((gate.x, gate.y), (4, 3));
    assert_eq!((gate.state1, gate.state2, gate.state3), (3, 12, 257));
}

#[test]
fn level_layout_edits_apply_in_order() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");

    let output = run_cli(&[
        "--level",
        "5",
        "--resize",
        "2x2",
        "--clear-room",
        "2,1",
        "--set-prince",
        "15,5,l",
        "--set-type",
        "palace",
        "--toggle-guard",
        "12,4,r",
        "--guard-kind",
        "shadow",
        "--guard-hp",
        "6",
        "--output",
        &s(&out),
        &s(&rom),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let session = Engine::new().open_path(&out).unwrap();
    let level = session.level(5).unwrap();
    assert_eq!((level.width(), level.height()), (2, 2));
    assert_eq!(level.level_type(), LevelType::Palace);
    assert_eq!((level.prince().x, level.prince().y), (15, 5));
    assert_eq!(level.prince().facing, Facing::Left);
    assert_eq!(level.start_room(), popmd_core::coords::RoomPos::new(2, 2));
    assert_eq!(session.tile(5, 5, 2).unwrap().object, TileObject::Floor);
    assert_eq!(session.tile(5, 15, 2).unwrap().object, TileObject::Space);
    let guard = level.guards().get(1).unwrap();
    assert_eq!((guard.x, guard.y, guard.hit_points), (12, 4, 6));
}

#[test]
fn settings_edits_round_trip() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");

    let output = run_cli(&[
        "--set-time",
        "60:00",
        "--set-hp",
        "4",
        "--set-start-level",
        "2",
        "--output",
        &s(&out),
        &s(&rom),
    ]);
    assert!(output.status.success());

    let output = run_cli(&["--settings", &s(&out)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["time=60:00", "hit_points=4", "start_level=2"]);
}

#[test]
fn bad_time_is_rejected_by_the_parser() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");
    let output = run_cli(&["--set-time", "1:75", "--output", &s(&out), &s(&rom)]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn out_of_range_tile_exits_with_usage_code() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");
    let output = run_cli(&["--set-tile", "11,1,wal", "--output", &s(&out), &s(&rom)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error setting tile"));
    assert!(!out.exists());
}

#[test]
fn quota_overflow_refuses_to_save() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let out = dir.path().join("out.bin");
    // 12 one-room levels plus 24x20 rooms is over the 459 room limit.
    let output = run_cli(&["--resize", "24x20", "--output", &s(&out), &s(&rom)]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("saving is not allowed"));
    assert!(!out.exists());
}

#[test]
fn in_place_save_writes_backup() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let original = fs::read(&rom).unwrap();
    let backup = dir.path().join("before.bin");

    let output = run_cli(&[
        "--set-tile",
        "1,1,spc",
        "--in-place",
        "--backup",
        &s(&backup),
        &s(&rom),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Backup written to"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("Saved {}", rom.display()));

    assert_eq!(fs::read(&backup).unwrap(), original);
    let session = Engine::new().open_path(&rom).unwrap();
    assert_eq!(session.tile(1, 1, 1).unwrap().object, TileObject::Space);
}

#[test]
fn seeded_randomize_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(dir.path());
    let first = dir.path().join("a.bin");
    let second = dir.path().join("b.bin");

    for out in [&first, &second] {
        let output = run_cli(&[
            "--level",
            "2",
            "--resize",
            "2x1",
            "--randomize",
            "--seed",
            "42",
            "--output",
            &s(out),
            &s(&rom),
        ]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}
