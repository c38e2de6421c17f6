use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use popmd_core::coords::{RoomPos, TilePos};
use popmd_core::core_api::{CoreError, CoreErrorCode, Engine, Session};
use popmd_core::facing::Facing;
use popmd_core::records::GuardKind;
use popmd_core::settings::GameSettings;
use popmd_core::tile::{LevelType, TileObject};
use popmd_render::{
    FieldSelection, JsonStyle, format_time, render_json_full, render_json_selected,
    render_level_json, render_level_map, render_object_tables, render_quota_table,
    render_summary,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_QUOTA: i32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LevelTypeArg {
    Dungeon,
    Palace,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GuardKindArg {
    Guard,
    Skeleton,
    Fat,
    Shadow,
    Jaffar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TileEdit {
    x: usize,
    y: usize,
    object: TileObject,
    graphics: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PrinceEdit {
    x: usize,
    y: usize,
    facing: Facing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GateEdit {
    x: usize,
    y: usize,
    state: u16,
    openness: u16,
    delay: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GuardEdit {
    x: usize,
    y: usize,
    facing: Facing,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "ROM")]
    path: PathBuf,
    /// Level used by --map, --objects and the level edits.
    #[arg(long, value_name = "N", default_value_t = 1)]
    level: usize,
    #[arg(long)]
    region: bool,
    #[arg(long)]
    levels: bool,
    #[arg(long)]
    sword: bool,
    #[arg(long)]
    settings: bool,
    #[arg(long)]
    quota: bool,
    #[arg(long)]
    map: bool,
    #[arg(long)]
    objects: bool,
    #[arg(long)]
    json: bool,
    /// Show diagnostics (structural warnings, table dumps) on stderr.
    #[arg(long)]
    debug: bool,
    #[arg(long = "set-tile", value_name = "X,Y,OBJ[,GFX]", value_parser = parse_tile_edit)]
    set_tile: Vec<TileEdit>,
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    resize: Option<(usize, usize)>,
    #[arg(long = "clear-room", value_name = "X,Y", value_parser = parse_pair)]
    clear_room: Vec<(usize, usize)>,
    #[arg(long = "set-prince", value_name = "X,Y,l|r", value_parser = parse_prince_edit)]
    set_prince: Option<PrinceEdit>,
    #[arg(long = "set-start-room", value_name = "X,Y", value_parser = parse_pair)]
    set_start_room: Option<(usize, usize)>,
    #[arg(long = "set-type")]
    set_type: Option<LevelTypeArg>,
    #[arg(
        long = "set-gate",
        value_name = "X,Y,STATE,OPENNESS,DELAY",
        value_parser = parse_gate_edit
    )]
    set_gate: Vec<GateEdit>,
    #[arg(long = "toggle-guard", value_name = "X,Y,l|r", value_parser = parse_guard_edit)]
    toggle_guard: Vec<GuardEdit>,
    #[arg(long = "guard-kind", default_value = "guard")]
    guard_kind: GuardKindArg,
    #[arg(long = "guard-skill", default_value_t = 0)]
    guard_skill: u32,
    #[arg(long = "guard-hp", default_value_t = 3)]
    guard_hp: u32,
    #[arg(long)]
    randomize: bool,
    #[arg(long, requires = "randomize")]
    seed: Option<u64>,
    #[arg(long = "set-time", value_name = "MM:SS", value_parser = parse_time)]
    set_time: Option<(u32, u32)>,
    #[arg(long = "set-hp")]
    set_hp: Option<u32>,
    #[arg(long = "set-start-level")]
    set_start_level: Option<u32>,
    #[arg(long, conflicts_with = "in_place")]
    output: Option<PathBuf>,
    #[arg(long = "in-place")]
    in_place: bool,
    #[arg(long, requires = "in_place")]
    backup: Option<PathBuf>,
}

impl Cli {
    fn has_edits(&self) -> bool {
        !self.set_tile.is_empty()
            || self.resize.is_some()
            || !self.clear_room.is_empty()
            || self.set_prince.is_some()
            || self.set_start_room.is_some()
            || self.set_type.is_some()
            || !self.set_gate.is_empty()
            || !self.toggle_guard.is_empty()
            || self.randomize
            || self.set_time.is_some()
            || self.set_hp.is_some()
            || self.set_start_level.is_some()
    }

    fn fields(&self) -> FieldSelection {
        FieldSelection {
            region: self.region,
            levels: self.levels,
            sword: self.sword,
            settings: self.settings,
            quota: self.quota,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let fields = cli.fields();
    let has_edits = cli.has_edits();
    let writes = cli.output.is_some() || cli.in_place;

    if has_edits && !writes {
        eprintln!("--set-* and other edit flags require --output <PATH> or --in-place");
        process::exit(EXIT_USAGE);
    }
    if !has_edits && writes {
        eprintln!("--output/--in-place require at least one edit flag");
        process::exit(EXIT_USAGE);
    }

    let engine = Engine::new();
    let mut session = engine.open_path(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error opening ROM: {}", cli.path.display());
        eprintln!("  {}", e.message);
        process::exit(exit_code(&e));
    });

    if has_edits {
        apply_edits(&cli, &mut session);
        write_rom(&cli, &mut session);
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else if cli.map || cli.objects {
            render_level_json(&session, cli.level).unwrap_or_else(|e| fail("rendering level", &e))
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(EXIT_FAILURE);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in selected_pairs(&fields, &session) {
            println!("{key}={value}");
        }
        return;
    }

    if cli.map || cli.objects {
        let level = session
            .level(cli.level)
            .unwrap_or_else(|e| fail("selecting level", &e));
        if cli.map {
            print!("{}", render_level_map(level));
        }
        if cli.objects {
            print!("{}", render_object_tables(level));
        }
        return;
    }

    if has_edits {
        match &cli.output {
            Some(out_path) => println!("Wrote edited ROM to {}", out_path.display()),
            None => println!("Saved {}", cli.path.display()),
        }
        return;
    }

    print!("{}", render_summary(&session));
    print!("{}", render_quota_table(&session.quota_report()));
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_edits(cli: &Cli, session: &mut Session) {
    let level = cli.level;

    if let Some((width, height)) = cli.resize {
        session
            .resize_level(level, width, height)
            .unwrap_or_else(|e| fail("resizing level", &e));
    }
    for &(x, y) in &cli.clear_room {
        session
            .clear_room(level, RoomPos::new(x, y))
            .unwrap_or_else(|e| fail("clearing room", &e));
    }
    if cli.randomize {
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        session
            .randomize_level(level, &mut rng)
            .unwrap_or_else(|e| fail("randomizing level", &e));
    }
    for edit in &cli.set_tile {
        session
            .set_tile(level, edit.x, edit.y, edit.object, edit.graphics)
            .unwrap_or_else(|e| fail("setting tile", &e));
    }
    for edit in &cli.set_gate {
        session
            .set_gate_attributes(
                level,
                TilePos::new(edit.x, edit.y),
                edit.state,
                edit.openness,
                edit.delay,
            )
            .unwrap_or_else(|e| fail("setting gate", &e));
    }
    for edit in &cli.toggle_guard {
        let outcome = session
            .toggle_guard(
                level,
                TilePos::new(edit.x, edit.y),
                to_core_guard_kind(cli.guard_kind),
                edit.facing,
                cli.guard_skill,
                cli.guard_hp,
            )
            .unwrap_or_else(|e| fail("toggling guard", &e));
        tracing::debug!(?outcome, x = edit.x, y = edit.y, "guard toggled");
    }
    if let Some(prince) = cli.set_prince {
        session
            .place_prince(level, TilePos::new(prince.x, prince.y), prince.facing)
            .unwrap_or_else(|e| fail("placing prince", &e));
    }
    if let Some((x, y)) = cli.set_start_room {
        session
            .set_start_room(level, RoomPos::new(x, y))
            .unwrap_or_else(|e| fail("setting start room", &e));
    }
    if let Some(kind) = cli.set_type {
        session
            .set_level_type(level, to_core_level_type(kind))
            .unwrap_or_else(|e| fail("setting level type", &e));
    }

    if cli.set_time.is_some() || cli.set_hp.is_some() || cli.set_start_level.is_some() {
        let mut settings: GameSettings = *session.settings();
        if let Some((minutes, seconds)) = cli.set_time {
            settings.minutes = minutes;
            settings.seconds = seconds;
        }
        if let Some(hp) = cli.set_hp {
            settings.hit_points = hp;
        }
        if let Some(start) = cli.set_start_level {
            settings.start_level = start;
        }
        session.set_settings(settings);
    }
}

fn write_rom(cli: &Cli, session: &mut Session) {
    if let Some(out_path) = &cli.output {
        session
            .save_to(out_path)
            .unwrap_or_else(|e| fail(&format!("writing {}", out_path.display()), &e));
        return;
    }
    let backup = session
        .save_in_place(cli.backup.as_deref())
        .unwrap_or_else(|e| fail(&format!("saving {}", cli.path.display()), &e));
    eprintln!("Backup written to {}", backup.display());
}

fn selected_pairs(fields: &FieldSelection, session: &Session) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    if fields.region {
        out.push(("region", session.region().to_string()));
        out.push(("level_count", session.store().level_count().to_string()));
    }
    if fields.levels {
        for summary in session.level_summaries() {
            out.push((
                "level",
                format!(
                    "{} {}x{} {} start={},{} prince={},{},{}",
                    summary.number,
                    summary.width,
                    summary.height,
                    summary.level_type,
                    summary.start_room.x,
                    summary.start_room.y,
                    summary.prince.x,
                    summary.prince.y,
                    summary.prince.facing.as_str()
                ),
            ));
        }
    }
    if fields.sword {
        let value = match session.store().sword_locations().last() {
            Some((level, pos)) => format!("{level},{},{}", pos.x, pos.y),
            None => "none".to_string(),
        };
        out.push(("sword", value));
    }
    if fields.settings {
        let settings = session.settings();
        out.push(("time", format_time(settings)));
        out.push(("hit_points", settings.hit_points.to_string()));
        out.push(("start_level", settings.start_level.to_string()));
    }
    if fields.quota {
        let report = session.quota_report();
        for line in &report.lines {
            out.push((line.item.as_str(), format!("{}/{}", line.used, line.allowed)));
        }
        out.push(("saving_allowed", report.all_ok().to_string()));
    }

    out
}

fn exit_code(err: &CoreError) -> i32 {
    match err.code {
        CoreErrorCode::QuotaExceeded => EXIT_QUOTA,
        CoreErrorCode::InvalidInput => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

fn fail(what: &str, err: &CoreError) -> ! {
    eprintln!("Error {what}: {}", err.message);
    process::exit(exit_code(err));
}

fn to_core_level_type(kind: LevelTypeArg) -> LevelType {
    match kind {
        LevelTypeArg::Dungeon => LevelType::Dungeon,
        LevelTypeArg::Palace => LevelType::Palace,
    }
}

fn to_core_guard_kind(kind: GuardKindArg) -> GuardKind {
    match kind {
        GuardKindArg::Guard => GuardKind::Guard,
        GuardKindArg::Skeleton => GuardKind::Skeleton,
        GuardKindArg::Fat => GuardKind::Fat,
        GuardKindArg::Shadow => GuardKind::Shadow,
        GuardKindArg::Jaffar => GuardKind::Jaffar,
    }
}

fn split_fields(value: &str, min: usize, max: usize) -> Result<Vec<&str>, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() < min || parts.len() > max {
        return Err(if min == max {
            format!("expected {min} comma-separated values, got \"{value}\"")
        } else {
            format!("expected {min} to {max} comma-separated values, got \"{value}\"")
        });
    }
    Ok(parts)
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number \"{value}\""))
}

fn parse_byte(value: &str) -> Result<u8, String> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).map_err(|_| format!("invalid byte \"{value}\"")),
        None => parse_number(value),
    }
}

fn parse_facing(value: &str) -> Result<Facing, String> {
    match value.to_ascii_lowercase().as_str() {
        "l" | "left" => Ok(Facing::Left),
        "r" | "right" => Ok(Facing::Right),
        other => Err(format!("invalid facing \"{other}\", expected l or r")),
    }
}

fn parse_pair(value: &str) -> Result<(usize, usize), String> {
    let parts = split_fields(value, 2, 2)?;
    Ok((parse_number(parts[0])?, parse_number(parts[1])?))
}

fn parse_size(value: &str) -> Result<(usize, usize), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got \"{value}\""))?;
    Ok((parse_number(w)?, parse_number(h)?))
}

fn parse_tile_edit(value: &str) -> Result<TileEdit, String> {
    let parts = split_fields(value, 3, 4)?;
    let object = TileObject::from_code(parts[2])
        .ok_or_else(|| format!("unknown tile object \"{}\"", parts[2]))?;
    let graphics = parts.get(3).map(|g| parse_byte(g)).transpose()?;
    Ok(TileEdit {
        x: parse_number(parts[0])?,
        y: parse_number(parts[1])?,
        object,
        graphics,
    })
}

fn parse_prince_edit(value: &str) -> Result<PrinceEdit, String> {
    let parts = split_fields(value, 3, 3)?;
    Ok(PrinceEdit {
        x: parse_number(parts[0])?,
        y: parse_number(parts[1])?,
        facing: parse_facing(parts[2])?,
    })
}

fn parse_gate_edit(value: &str) -> Result<GateEdit, String> {
    let parts = split_fields(value, 5, 5)?;
    Ok(GateEdit {
        x: parse_number(parts[0])?,
        y: parse_number(parts[1])?,
        state: parse_number(parts[2])?,
        openness: parse_number(parts[3])?,
        delay: parse_number(parts[4])?,
    })
}

fn parse_guard_edit(value: &str) -> Result<GuardEdit, String> {
    let parts = split_fields(value, 3, 3)?;
    Ok(GuardEdit {
        x: parse_number(parts[0])?,
        y: parse_number(parts[1])?,
        facing: parse_facing(parts[2])?,
    })
}

fn parse_time(value: &str) -> Result<(u32, u32), String> {
    let (min, sec) = value
        .split_once(':')
        .ok_or_else(|| format!("expected MM:SS, got \"{value}\""))?;
    let sec: u32 = parse_number(sec)?;
    if sec >= 60 {
        return Err(format!("seconds must be below 60, got {sec}"));
    }
    Ok((parse_number(min)?, sec))
}
