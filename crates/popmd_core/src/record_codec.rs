//! Fixed-size category record layouts.

use std::io::{self, Read, Seek, Write};

use tracing::warn;

use crate::category::Category;
use crate::codec::{BigEndianReader, BigEndianWriter};
use crate::coords::{Anchor, load_x, save_x};
use crate::facing::Facing;
use crate::records::{
    Chomper, Door, DoorKind, Gate, GateRef, Guard, GuardKind, LooseFloor, Plate, Potion, Record,
    Spike,
};
use crate::region::known_guard_sprites;

/// Leading word shared by loose floors, plates, chompers and spikes.
const MARKER: [u8; 2] = [0x00, 0x01];

fn expect_bytes<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    expected: &[u8],
    category: Category,
    level: usize,
) -> io::Result<()> {
    for &want in expected {
        let have = r.read_u8()?;
        if have != want {
            warn!(
                level,
                %category,
                expected = want,
                found = have,
                "unexpected padding byte"
            );
        }
    }
    Ok(())
}

fn read_pos<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    anchor: Anchor,
) -> io::Result<(usize, usize)> {
    let y = anchor.load_y(r.read_u16()?);
    let x = load_x(r.read_u16()?);
    Ok((x, y))
}

/// Decode one record of `category`; the reader must sit at its first byte.
pub fn decode_record<R: Read + Seek>(
    r: &mut BigEndianReader<R>,
    category: Category,
    level: usize,
) -> io::Result<Record> {
    let anchor = category.anchor();
    let record = match category {
        Category::Guards => {
            expect_bytes(r, &[0, 0], category, level)?;
            let (x, y) = read_pos(r, anchor)?;
            let facing = Facing::from_raw(r.read_u16()?);
            expect_bytes(r, &[0, 0], category, level)?;
            let sprite = r.read_u32()?;
            let kind_raw = r.read_u16()?;
            match known_guard_sprites(kind_raw) {
                Some(known) if !known.contains(&sprite) => {
                    warn!(level, x, y, kind = kind_raw, sprite, "unexpected guard sprite");
                }
                None => warn!(level, x, y, kind = kind_raw, "unknown guard type"),
                _ => {}
            }
            let skill = r.read_u16()? as u32;
            let hit_points = r.read_u16()? as u32;
            expect_bytes(r, &[0, 0, 0, 0], category, level)?;
            Record::Guard(Guard {
                x,
                y,
                facing,
                sprite,
                kind: GuardKind::from_raw(kind_raw),
                skill,
                hit_points,
            })
        }
        Category::Doors => {
            let kind = DoorKind::from_raw(r.read_u16()?);
            let (x, y) = read_pos(r, anchor)?;
            if let DoorKind::Unknown(raw) = kind {
                warn!(level, x, y, kind = raw, "strange door type");
            }
            expect_bytes(r, &[0, 0, 0, 0], category, level)?;
            Record::Door(Door { x, y, kind })
        }
        Category::Gates => {
            let state1 = r.read_u16()?;
            let (x, y) = read_pos(r, anchor)?;
            Record::Gate(Gate {
                x,
                y,
                state1,
                state2: r.read_u16()?,
                state3: r.read_u16()?,
                unknown: r.read_u16()?,
            })
        }
        Category::Loose => {
            expect_bytes(r, &MARKER, category, level)?;
            let (x, y) = read_pos(r, anchor)?;
            expect_bytes(r, &[0, 0, 0, 0], category, level)?;
            Record::Loose(LooseFloor { x, y })
        }
        Category::Raise | Category::Drop => {
            expect_bytes(r, &MARKER, category, level)?;
            let (x, y) = read_pos(r, anchor)?;
            expect_bytes(r, &[0, 0], category, level)?;
            let gates = [
                GateRef::from_raw(r.read_u16()?),
                GateRef::from_raw(r.read_u16()?),
                GateRef::from_raw(r.read_u16()?),
            ];
            let plate = Plate { x, y, gates };
            if category == Category::Raise {
                Record::Raise(plate)
            } else {
                Record::Drop(plate)
            }
        }
        Category::Chompers => {
            expect_bytes(r, &MARKER, category, level)?;
            let (x, y) = read_pos(r, anchor)?;
            expect_bytes(r, &[0, 0, 0, 0], category, level)?;
            Record::Chomper(Chomper { x, y })
        }
        Category::Spikes => {
            expect_bytes(r, &MARKER, category, level)?;
            let (x, y) = read_pos(r, anchor)?;
            expect_bytes(r, &[0xFF, 0xFF], category, level)?;
            Record::Spike(Spike { x, y })
        }
        Category::Potions => {
            let color = r.read_u16()?;
            let (x, y) = read_pos(r, anchor)?;
            expect_bytes(r, &[0, 0], category, level)?;
            let effect = r.read_u16()?;
            Record::Potion(Potion {
                x,
                y,
                color,
                effect,
            })
        }
    };
    Ok(record)
}

fn write_pos<W: Write + Seek>(
    w: &mut BigEndianWriter<W>,
    anchor: Anchor,
    x: usize,
    y: usize,
) -> io::Result<()> {
    w.write_u16(anchor.save_y(y))?;
    w.write_u16(save_x(x))
}

/// Encode one record at the writer's current position.
pub fn encode_record<W: Write + Seek>(w: &mut BigEndianWriter<W>, record: &Record) -> io::Result<()> {
    let anchor = record.category().anchor();
    match *record {
        Record::Guard(g) => {
            w.write_bytes(&[0, 0])?;
            write_pos(w, anchor, g.x, g.y)?;
            w.write_u16(g.facing.raw() as u32)?;
            w.write_bytes(&[0, 0])?;
            w.write_u32(g.sprite)?;
            w.write_u16(g.kind.raw() as u32)?;
            w.write_u16(g.skill)?;
            w.write_u16(g.hit_points)?;
            w.write_bytes(&[0, 0, 0, 0])
        }
        Record::Door(d) => {
            w.write_u16(d.kind.raw() as u32)?;
            write_pos(w, anchor, d.x, d.y)?;
            w.write_bytes(&[0, 0, 0, 0])
        }
        Record::Gate(g) => {
            w.write_u16(g.state1 as u32)?;
            write_pos(w, anchor, g.x, g.y)?;
            w.write_u16(g.state2 as u32)?;
            w.write_u16(g.state3 as u32)?;
            w.write_u16(g.unknown as u32)
        }
        Record::Loose(l) => {
            w.write_bytes(&MARKER)?;
            write_pos(w, anchor, l.x, l.y)?;
            w.write_bytes(&[0, 0, 0, 0])
        }
        Record::Raise(p) | Record::Drop(p) => {
            w.write_bytes(&MARKER)?;
            write_pos(w, anchor, p.x, p.y)?;
            w.write_bytes(&[0, 0])?;
            for gate in p.gates {
                w.write_u16(gate.raw() as u32)?;
            }
            Ok(())
        }
        Record::Chomper(c) => {
            w.write_bytes(&MARKER)?;
            write_pos(w, anchor, c.x, c.y)?;
            w.write_bytes(&[0, 0, 0, 0])
        }
        Record::Spike(s) => {
            w.write_bytes(&MARKER)?;
            write_pos(w, anchor, s.x, s.y)?;
            w.write_bytes(&[0xFF, 0xFF])
        }
        Record::Potion(p) => {
            w.write_u16(p.color as u32)?;
            write_pos(w, anchor, p.x, p.y)?;
            w.write_bytes(&[0, 0])?;
            w.write_u16(p.effect as u32)
        }
    }
}
