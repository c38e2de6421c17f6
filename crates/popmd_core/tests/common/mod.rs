#![allow(dead_code)]

//! In-memory ROM images for tests.
//!
//! The builder lays bytes out by hand from the region offsets so the loader
//! can be checked against something other than the saver.

use popmd_core::category::Category;
use popmd_core::region::{Region, RegionProfile};

pub const FACING_LEFT: u16 = 0x0000;
pub const FACING_RIGHT: u16 = 0x0800;

pub const SPACE: u8 = 0x00;
pub const WALL: u8 = 0x01;
pub const FLOOR: u8 = 0x02;
pub const RAISE: u8 = 0x03;
pub const DROP: u8 = 0x04;
pub const GATE: u8 = 0x05;
pub const LOOSE: u8 = 0x06;
pub const SPIKE: u8 = 0x07;
pub const CHOMPER: u8 = 0x08;
pub const POTION: u8 = 0x09;
pub const DOOR: u8 = 0x0A;
pub const SWORD: u8 = 0x0B;

pub const GATE_REF_NONE: u16 = 0xFFFD;
pub const GATE_REF_MIRROR: u16 = 0xFFFE;
pub const GATE_REF_EXIT: u16 = 0xFFFF;

#[derive(Debug, Clone)]
struct LevelSpec {
    width: usize,
    height: usize,
    level_type: u16,
    start_room: (usize, usize),
    prince: (usize, usize, u16),
    objects: Vec<u8>,
    graphics: Vec<u8>,
    records: Vec<Vec<Vec<u8>>>,
}

impl LevelSpec {
    fn new(width: usize, height: usize) -> Self {
        let tiles = width * height * 30;
        Self {
            width,
            height,
            level_type: 0,
            start_room: (1, 1),
            prince: (1, 1, FACING_RIGHT),
            objects: vec![FLOOR; tiles],
            graphics: vec![0; tiles],
            records: vec![Vec::new(); Category::ALL.len()],
        }
    }

    fn rows(&self) -> usize {
        self.height * 3
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (x - 1) * self.rows() + (y - 1)
    }
}

#[derive(Debug, Clone)]
pub struct RomBuilder {
    region: Region,
    levels: Vec<LevelSpec>,
    verify_offset: u64,
    verify_text: Vec<u8>,
    settings: Option<(u32, u8, u8)>,
}

fn be16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put(image: &mut [u8], offset: u64, bytes: &[u8]) {
    let start = offset as usize;
    image[start..start + bytes.len()].copy_from_slice(bytes);
}

impl RomBuilder {
    /// Every level 1x1 room of floor, prince at (1, 1) facing right.
    pub fn new(region: Region) -> Self {
        let count = region.profile().level_count;
        Self {
            region,
            levels: (0..count).map(|_| LevelSpec::new(1, 1)).collect(),
            verify_offset: 0x150,
            verify_text: b"PRINCE OF PERSIA".to_vec(),
            settings: None,
        }
    }

    pub fn us() -> Self {
        Self::new(Region::Us)
    }

    pub fn eu() -> Self {
        Self::new(Region::Eu)
    }

    pub fn profile(&self) -> &'static RegionProfile {
        self.region.profile()
    }

    fn level(&mut self, level: usize) -> &mut LevelSpec {
        &mut self.levels[level - 1]
    }

    pub fn verify_text(mut self, offset: u64, text: &[u8]) -> Self {
        self.verify_offset = offset;
        self.verify_text = text.to_vec();
        self
    }

    pub fn size(mut self, level: usize, width: usize, height: usize) -> Self {
        let spec = self.level(level);
        let keep = (spec.level_type, spec.start_room, spec.prince);
        *spec = LevelSpec::new(width, height);
        (spec.level_type, spec.start_room, spec.prince) = keep;
        self
    }

    pub fn level_type(mut self, level: usize, raw: u16) -> Self {
        self.level(level).level_type = raw;
        self
    }

    pub fn start_room(mut self, level: usize, x: usize, y: usize) -> Self {
        self.level(level).start_room = (x, y);
        self
    }

    pub fn prince(mut self, level: usize, x: usize, y: usize, facing: u16) -> Self {
        self.level(level).prince = (x, y, facing);
        self
    }

    pub fn tile(mut self, level: usize, x: usize, y: usize, object: u8, graphics: u8) -> Self {
        let spec = self.level(level);
        let i = spec.index(x, y);
        spec.objects[i] = object;
        spec.graphics[i] = graphics;
        self
    }

    /// Raw starting time in frames, hit points byte and stored level byte.
    pub fn settings(mut self, frames: u32, hit_points: u8, level_byte: u8) -> Self {
        self.settings = Some((frames, hit_points, level_byte));
        self
    }

    fn record(mut self, level: usize, category: Category, bytes: Vec<u8>) -> Self {
        assert_eq!(bytes.len(), category.record_size());
        let index = Category::ALL
            .iter()
            .position(|&c| c == category)
            .expect("category listed in ALL");
        self.level(level).records[index].push(bytes);
        self
    }

    pub fn guard(
        self,
        level: usize,
        x: usize,
        y: usize,
        facing: u16,
        kind: u16,
        skill: u16,
        hit_points: u16,
    ) -> Self {
        let sprite = self.profile().guard_sprites[kind as usize];
        let mut b = vec![0, 0];
        be16(&mut b, bottom_y(y));
        be16(&mut b, px_x(x));
        be16(&mut b, facing);
        b.extend_from_slice(&[0, 0]);
        b.extend_from_slice(&sprite.to_be_bytes());
        be16(&mut b, kind);
        be16(&mut b, skill);
        be16(&mut b, hit_points);
        b.extend_from_slice(&[0, 0, 0, 0]);
        self.record(level, Category::Guards, b)
    }

    pub fn door(self, level: usize, x: usize, y: usize, kind: u16) -> Self {
        let mut b = Vec::new();
        be16(&mut b, kind);
        be16(&mut b, top_y(y));
        be16(&mut b, px_x(x));
        b.extend_from_slice(&[0, 0, 0, 0]);
        self.record(level, Category::Doors, b)
    }

    pub fn gate(self, level: usize, x: usize, y: usize, words: [u16; 3]) -> Self {
        let mut b = Vec::new();
        be16(&mut b, words[0]);
        be16(&mut b, top_y(y));
        be16(&mut b, px_x(x));
        be16(&mut b, words[1]);
        be16(&mut b, words[2]);
        be16(&mut b, 0);
        self.record(level, Category::Gates, b)
    }

    fn marker_record(self, level: usize, category: Category, y_px: u16, x: usize, tail: &[u8]) -> Self {
        let mut b = vec![0, 1];
        be16(&mut b, y_px);
        be16(&mut b, px_x(x));
        b.extend_from_slice(tail);
        self.record(level, category, b)
    }

    pub fn loose(self, level: usize, x: usize, y: usize) -> Self {
        self.marker_record(level, Category::Loose, bottom_y(y), x, &[0, 0, 0, 0])
    }

    /// `refs` are the raw stored words: 0-based gate index or a sentinel.
    pub fn raise(self, level: usize, x: usize, y: usize, refs: [u16; 3]) -> Self {
        self.marker_record(level, Category::Raise, bottom_y(y), x, &plate_tail(refs))
    }

    pub fn drop_plate(self, level: usize, x: usize, y: usize, refs: [u16; 3]) -> Self {
        self.marker_record(level, Category::Drop, bottom_y(y), x, &plate_tail(refs))
    }

    pub fn chomper(self, level: usize, x: usize, y: usize) -> Self {
        self.marker_record(level, Category::Chompers, top_y(y), x, &[0, 0, 0, 0])
    }

    pub fn spike(self, level: usize, x: usize, y: usize) -> Self {
        self.marker_record(level, Category::Spikes, bottom_y(y), x, &[0xFF, 0xFF])
    }

    pub fn potion(self, level: usize, x: usize, y: usize, color: u16, effect: u16) -> Self {
        let mut b = Vec::new();
        be16(&mut b, color);
        be16(&mut b, bottom_y(y));
        be16(&mut b, px_x(x));
        b.extend_from_slice(&[0, 0]);
        be16(&mut b, effect);
        self.record(level, Category::Potions, b)
    }

    pub fn image_len(&self) -> usize {
        match self.region {
            Region::Us => 0x30000,
            Region::Eu => 0x60000,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let profile = self.profile();
        let mut image = vec![0u8; self.image_len()];

        put(&mut image, self.verify_offset, &self.verify_text);
        image[0x1F0] = self.region.marker();

        let mut prince = Vec::new();
        for (index, spec) in self.levels.iter().enumerate() {
            let (dy, dx) = profile.prince_correction(index + 1);
            let (x, y, facing) = spec.prince;
            be16(&mut prince, (bottom_y(y) as u32 + dy) as u16);
            be16(&mut prince, (px_x(x) as u32 + dx) as u16);
            be16(&mut prince, facing);
        }
        put(&mut image, profile.prince_table, &prince);

        let mut headers = Vec::new();
        let mut planes = Vec::new();
        let mut offset = profile.tile_block as u32;
        for spec in &self.levels {
            let tiles = spec.objects.len() as u32;
            be16(&mut headers, (spec.height * 192) as u16);
            be16(&mut headers, (spec.width * 320) as u16);
            be16(&mut headers, tiles as u16);
            headers.extend_from_slice(&offset.to_be_bytes());
            headers.extend_from_slice(&(offset + tiles).to_be_bytes());
            be16(&mut headers, ((spec.start_room.1 - 1) * 192) as u16);
            be16(&mut headers, ((spec.start_room.0 - 1) * 320) as u16);
            be16(&mut headers, spec.level_type);
            planes.extend_from_slice(&spec.graphics);
            planes.extend_from_slice(&spec.objects);
            offset += 2 * tiles;
        }
        put(&mut image, profile.level_table, &headers);
        put(&mut image, profile.tile_block, &planes);

        for (index, category) in Category::ALL.iter().enumerate() {
            let base = profile.categories.get(*category);
            let mut table = Vec::new();
            let mut records = Vec::new();
            let mut next = base as u32 + (self.levels.len() * 6) as u32;
            for spec in &self.levels {
                let list = &spec.records[index];
                be16(&mut table, list.len() as u16);
                if list.is_empty() {
                    table.extend_from_slice(&0u32.to_be_bytes());
                } else {
                    table.extend_from_slice(&next.to_be_bytes());
                    next += (list.len() * category.record_size()) as u32;
                }
                for record in list {
                    records.extend_from_slice(record);
                }
            }
            table.extend_from_slice(&records);
            put(&mut image, base, &table);
        }

        if let Some((frames, hit_points, level_byte)) = self.settings {
            let offsets = &profile.settings;
            put(&mut image, offsets.starting_time, &frames.to_be_bytes());
            image[offsets.starting_hit_points as usize] = hit_points;
            image[offsets.starting_level as usize] = level_byte;
        }

        image
    }
}

pub fn bottom_y(y: usize) -> u16 {
    (y * 64 - 1) as u16
}

pub fn top_y(y: usize) -> u16 {
    ((y - 1) * 64) as u16
}

pub fn px_x(x: usize) -> u16 {
    ((x - 1) * 32) as u16
}

fn plate_tail(refs: [u16; 3]) -> Vec<u8> {
    let mut b = vec![0, 0];
    for r in refs {
        be16(&mut b, r);
    }
    b
}

pub fn word_at(image: &[u8], offset: u64) -> u16 {
    let i = offset as usize;
    u16::from_be_bytes([image[i], image[i + 1]])
}

pub fn dword_at(image: &[u8], offset: u64) -> u32 {
    let i = offset as usize;
    u32::from_be_bytes([image[i], image[i + 1], image[i + 2], image[i + 3]])
}
