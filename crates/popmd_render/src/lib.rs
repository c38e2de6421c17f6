use std::fmt::Write as _;

use popmd_core::category::Category;
use popmd_core::coords::{ROOM_TILE_HEIGHT, ROOM_TILE_WIDTH, TilePos};
use popmd_core::core_api::{CoreError, LevelSummary, Session};
use popmd_core::quota::QuotaReport;
use popmd_core::records::{Positioned, Record};
use popmd_core::settings::GameSettings;
use popmd_core::store::Level;
use popmd_core::tile::TileObject;
use serde_json::{Map as JsonMap, Value as JsonValue};

const QUOTA_COL_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub region: bool,
    pub levels: bool,
    pub sword: bool,
    pub settings: bool,
    pub quota: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.region || self.levels || self.sword || self.settings || self.quota
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    let fields = FieldSelection {
        region: true,
        levels: true,
        sword: true,
        settings: true,
        quota: true,
    };
    render_json_selected(session, &fields, style)
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    if fields.region {
        out.insert(
            "region".to_string(),
            JsonValue::String(session.region().to_string()),
        );
        out.insert(
            "level_count".to_string(),
            JsonValue::from(session.store().level_count()),
        );
    }
    if fields.levels {
        out.insert(
            "levels".to_string(),
            JsonValue::Array(
                session
                    .level_summaries()
                    .iter()
                    .map(level_summary_to_json)
                    .collect(),
            ),
        );
    }
    if fields.sword {
        out.insert("sword".to_string(), sword_to_json(session));
    }
    if fields.settings {
        out.insert(
            "settings".to_string(),
            settings_to_json(session.settings()),
        );
    }
    if fields.quota {
        out.insert(
            "quota".to_string(),
            quota_to_json(&session.quota_report()),
        );
    }

    out
}

fn level_summary_to_json(summary: &LevelSummary) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("level".to_string(), JsonValue::from(summary.number));
    m.insert("width".to_string(), JsonValue::from(summary.width));
    m.insert("height".to_string(), JsonValue::from(summary.height));
    m.insert("rooms".to_string(), JsonValue::from(summary.rooms));
    m.insert(
        "type".to_string(),
        JsonValue::String(summary.level_type.to_string()),
    );
    m.insert(
        "start_room".to_string(),
        JsonValue::Array(vec![
            JsonValue::from(summary.start_room.x),
            JsonValue::from(summary.start_room.y),
        ]),
    );
    m.insert("prince".to_string(), prince_to_json(summary));
    let mut counts = JsonMap::new();
    for (category, count) in &summary.counts {
        counts.insert(category.as_str().to_string(), JsonValue::from(*count));
    }
    m.insert("counts".to_string(), JsonValue::Object(counts));
    JsonValue::Object(m)
}

fn prince_to_json(summary: &LevelSummary) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("x".to_string(), JsonValue::from(summary.prince.x));
    m.insert("y".to_string(), JsonValue::from(summary.prince.y));
    m.insert(
        "facing".to_string(),
        JsonValue::String(summary.prince.facing.as_str().to_string()),
    );
    JsonValue::Object(m)
}

fn sword_to_json(session: &Session) -> JsonValue {
    match session.store().sword_locations().last() {
        Some((level, pos)) => {
            let mut m = JsonMap::new();
            m.insert("level".to_string(), JsonValue::from(*level));
            m.insert("x".to_string(), JsonValue::from(pos.x));
            m.insert("y".to_string(), JsonValue::from(pos.y));
            JsonValue::Object(m)
        }
        None => JsonValue::Null,
    }
}

fn settings_to_json(settings: &GameSettings) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "time".to_string(),
        JsonValue::String(format_time(settings)),
    );
    m.insert("hit_points".to_string(), JsonValue::from(settings.hit_points));
    m.insert(
        "start_level".to_string(),
        JsonValue::from(settings.start_level),
    );
    JsonValue::Object(m)
}

fn quota_to_json(report: &QuotaReport) -> JsonValue {
    let mut m = JsonMap::new();
    for line in &report.lines {
        let mut entry = JsonMap::new();
        entry.insert("used".to_string(), JsonValue::from(line.used));
        entry.insert("allowed".to_string(), JsonValue::from(line.allowed));
        entry.insert("ok".to_string(), JsonValue::Bool(line.ok()));
        m.insert(line.item.as_str().to_string(), JsonValue::Object(entry));
    }
    m.insert("saving_allowed".to_string(), JsonValue::Bool(report.all_ok()));
    JsonValue::Object(m)
}

/// One level in full: header fields, both tile planes and every record.
pub fn render_level_json(session: &Session, level: usize) -> Result<JsonValue, CoreError> {
    let lvl = session.level(level)?;
    let mut m = JsonMap::new();

    if let JsonValue::Object(summary) = level_summary_to_json(&LevelSummary::of(lvl)) {
        m.extend(summary);
    }
    m.insert("objects".to_string(), plane_to_json(lvl, |pos| {
        JsonValue::String(lvl.object(pos).unwrap_or(TileObject::Space).to_string())
    }));
    m.insert("graphics".to_string(), plane_to_json(lvl, |pos| {
        JsonValue::from(lvl.tile(pos).map_or(0, |t| t.graphics))
    }));

    let mut records = JsonMap::new();
    for category in Category::ALL {
        records.insert(
            category.as_str().to_string(),
            JsonValue::Array(lvl.records(category).iter().map(record_to_json).collect()),
        );
    }
    m.insert("records".to_string(), JsonValue::Object(records));
    Ok(JsonValue::Object(m))
}

/// Rows top to bottom, each row left to right.
fn plane_to_json(level: &Level, cell: impl Fn(TilePos) -> JsonValue) -> JsonValue {
    JsonValue::Array(
        (1..=level.tile_rows())
            .map(|y| {
                JsonValue::Array(
                    (1..=level.tile_columns())
                        .map(|x| cell(TilePos::new(x, y)))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn record_to_json(record: &Record) -> JsonValue {
    let pos = record.pos();
    let mut m = JsonMap::new();
    m.insert("x".to_string(), JsonValue::from(pos.x));
    m.insert("y".to_string(), JsonValue::from(pos.y));

    match record {
        Record::Guard(g) => {
            m.insert("kind".to_string(), JsonValue::String(g.kind.to_string()));
            m.insert(
                "facing".to_string(),
                JsonValue::String(g.facing.as_str().to_string()),
            );
            m.insert("skill".to_string(), JsonValue::from(g.skill));
            m.insert("hit_points".to_string(), JsonValue::from(g.hit_points));
            m.insert(
                "sprite".to_string(),
                JsonValue::String(format!("0x{:X}", g.sprite)),
            );
        }
        Record::Door(d) => {
            m.insert("kind".to_string(), JsonValue::String(d.kind.to_string()));
        }
        Record::Gate(g) => {
            m.insert(
                "state".to_string(),
                JsonValue::String(g.state().to_string()),
            );
            m.insert(
                "words".to_string(),
                JsonValue::Array(vec![
                    JsonValue::from(g.state1),
                    JsonValue::from(g.state2),
                    JsonValue::from(g.state3),
                ]),
            );
        }
        Record::Raise(p) | Record::Drop(p) => {
            m.insert(
                "gates".to_string(),
                JsonValue::Array(
                    p.gates
                        .iter()
                        .map(|g| JsonValue::String(g.to_string()))
                        .collect(),
                ),
            );
        }
        Record::Potion(p) => {
            m.insert("color".to_string(), JsonValue::String(p.color_text()));
            m.insert("effect".to_string(), JsonValue::String(p.effect_text()));
        }
        Record::Loose(_) | Record::Chomper(_) | Record::Spike(_) => {}
    }

    JsonValue::Object(m)
}

/// Tile map dump: one three letter code per tile, rooms boxed off.
pub fn render_level_map(level: &Level) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "Level {} ({}x{} rooms, {})",
        level.number(),
        level.width(),
        level.height(),
        level.level_type()
    )
    .expect("writing to String cannot fail");

    let row_len = (level.width() * (ROOM_TILE_WIDTH * 4 + 2)).saturating_sub(1);
    let divider = "-".repeat(row_len);

    for y in 1..=level.tile_rows() {
        if (y - 1) % ROOM_TILE_HEIGHT == 0 {
            writeln!(&mut out, "{divider}").expect("writing to String cannot fail");
        }
        let mut line = String::with_capacity(row_len);
        for x in 1..=level.tile_columns() {
            if x > 1 {
                line.push_str(if (x - 1) % ROOM_TILE_WIDTH == 0 { " | " } else { " " });
            }
            let object = level.object(TilePos::new(x, y)).unwrap_or(TileObject::Space);
            line.push_str(&object.to_string());
        }
        writeln!(&mut out, "{line}").expect("writing to String cannot fail");
    }
    writeln!(&mut out, "{divider}").expect("writing to String cannot fail");

    out
}

/// Every non-empty category table of a level, one record per line.
pub fn render_object_tables(level: &Level) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        let records = level.records(category);
        if records.is_empty() {
            continue;
        }
        writeln!(&mut out, " ::: {} ({}) :::", category, records.len())
            .expect("writing to String cannot fail");
        for (index, record) in records.iter().enumerate() {
            writeln!(&mut out, "{:>3}. {}", index + 1, record_line(record))
                .expect("writing to String cannot fail");
        }
    }
    if out.is_empty() {
        out.push_str("no objects\n");
    }
    out
}

fn record_line(record: &Record) -> String {
    let pos = record.pos();
    let at = format!("({:>3}, {:>2})", pos.x, pos.y);
    match record {
        Record::Guard(g) => format!(
            "{at} {} facing {} skill {} hp {}",
            g.kind,
            g.facing.as_str(),
            g.skill,
            g.hit_points
        ),
        Record::Door(d) => format!("{at} {}", d.kind),
        Record::Gate(g) => format!("{at} {}", g.state()),
        Record::Raise(p) | Record::Drop(p) => format!(
            "{at} gates {} {} {}",
            p.gates[0], p.gates[1], p.gates[2]
        ),
        Record::Potion(p) => format!("{at} {} {}", p.color_text(), p.effect_text()),
        Record::Loose(_) | Record::Chomper(_) | Record::Spike(_) => at,
    }
}

pub fn render_quota_table(report: &QuotaReport) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{:<w$}{:>6}{:>8}",
        "item",
        "used",
        "allowed",
        w = QUOTA_COL_WIDTH
    )
    .expect("writing to String cannot fail");
    for line in &report.lines {
        writeln!(
            &mut out,
            "{:<w$}{:>6}{:>8}{}",
            line.item.as_str(),
            line.used,
            line.allowed,
            if line.ok() { "" } else { "  TOO MANY" },
            w = QUOTA_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    writeln!(
        &mut out,
        "saving {}",
        if report.all_ok() { "allowed" } else { "NOT allowed" }
    )
    .expect("writing to String cannot fail");
    out
}

/// Short text overview of the whole ROM.
pub fn render_summary(session: &Session) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "Region: {} ({} levels)",
        session.region(),
        session.store().level_count()
    )
    .expect("writing to String cannot fail");

    for summary in session.level_summaries() {
        let objects: usize = summary.counts.iter().map(|(_, n)| n).sum();
        writeln!(
            &mut out,
            "{:>3}: {:>2}x{:<2} {:<8} start room ({}, {}) prince ({}, {}) {}  objects {}",
            summary.number,
            summary.width,
            summary.height,
            summary.level_type.as_str(),
            summary.start_room.x,
            summary.start_room.y,
            summary.prince.x,
            summary.prince.y,
            summary.prince.facing.as_str(),
            objects
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn format_time(settings: &GameSettings) -> String {
    format!("{}:{:02}", settings.minutes, settings.seconds)
}
