use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use popmd_core::region::{REGION_OFFSET, Region, VERIFY_TEXT};
use popmd_core::saver::save;
use popmd_core::store::{Level, LevelStore};
use popmd_core::tile::{LevelType, TileObject};
use serde_json::Value;
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_popmd"))
        .args(args)
        .output()
        .expect("failed to run popmd CLI")
}

/// Writes a blank EU ROM with a sword on level 2 and returns its path.
fn write_rom(dir: &Path) -> PathBuf {
    let region = Region::Eu;
    let levels = (1..=region.profile().level_count)
        .map(|n| Level::new(n, 1, 1, LevelType::Dungeon))
        .collect();
    let mut store = LevelStore::new(region, levels);
    store.set_tile(2, 4, 2, TileObject::Sword, None).unwrap();
    store.set_tile(1, 5, 3, TileObject::Potion, None).unwrap();

    let mut image = vec![0u8; 0x60000];
    image[0x120..0x130].copy_from_slice(VERIFY_TEXT);
    image[REGION_OFFSET as usize] = region.marker();
    let bytes = save(Cursor::new(image), &store).unwrap().into_inner();

    let path = dir.join("pop_eu.bin");
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn cli_prints_region_fields() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--region", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["region=EU", "level_count=17"]);
}

#[test]
fn cli_prints_multiple_requested_fields_in_fixed_order() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--settings", "--sword", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["sword=2,4,2", "time=0:00", "hit_points=0", "start_level=1"]
    );
}

#[test]
fn cli_prints_quota_lines() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--quota", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "rooms=17/541"));
    assert!(stdout.lines().any(|l| l == "potions=1/59"));
    assert_eq!(stdout.lines().last(), Some("saving_allowed=true"));
}

#[test]
fn cli_json_full_is_valid() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--json", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["region"], "EU");
    assert_eq!(json["sword"]["level"], 2);
    assert_eq!(json["levels"][0]["counts"]["potions"], 1);
}

#[test]
fn cli_json_level_dump_for_map_flag() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--json", "--map", "--level", "2", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["level"], 2);
    assert_eq!(json["objects"][1][3], "swd");
}

#[test]
fn cli_map_and_objects_are_text() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--map", "--objects", &path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Level 1 (1x1 rooms, dungeon)\n"));
    assert!(stdout.contains("spc spc spc spc pot spc"));
    assert!(stdout.contains(" ::: potions (1) :::"));
    assert!(stdout.contains("red heal"));
}

#[test]
fn cli_without_field_flags_prints_summary_and_quota() {
    let dir = TempDir::new().unwrap();
    let path = write_rom(dir.path());
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&[&path]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Region: EU (17 levels)"));
    assert!(stdout.trim_end().ends_with("saving allowed"));
}

#[test]
fn cli_rejects_files_that_are_not_roms() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("junk.bin");
    fs::write(&path, vec![0u8; 0x400]).unwrap();
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--region", &path]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error opening ROM"));
    assert!(stderr.contains("not a Prince of Persia"));
}

#[test]
fn cli_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.bin");
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--region", &path]);
    assert_eq!(output.status.code(), Some(1));
}
