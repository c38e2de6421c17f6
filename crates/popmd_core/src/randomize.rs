//! Random level generation from space, wall and floor tiles.
//!
//! Tiles are drawn bottom row first, left to right, so the left and lower
//! neighbours of every tile are already final when its graphics are picked.
//! An empty tile is never placed directly above a wall.

use rand::Rng;
use tracing::debug;

use crate::coords::{ROOM_TILE_HEIGHT, TilePos};
use crate::core_api::CoreError;
use crate::store::LevelStore;
use crate::tile::TileObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shade {
    Blue,
    Brown,
}

/// What surrounds the tile being drawn.
#[derive(Debug, Clone, Copy)]
struct Context {
    /// Row inside the room, 1..=3.
    row: usize,
    shade: Shade,
    left: TileObject,
    left_down: TileObject,
}

impl Context {
    fn by_row(&self, rows: [u8; 3]) -> u8 {
        rows[self.row - 1]
    }

    fn by_shade(&self, blue: u8, brown: u8) -> u8 {
        match self.shade {
            Shade::Blue => blue,
            Shade::Brown => brown,
        }
    }
}

fn dungeon_graphics(object: TileObject, variant: usize, ctx: &Context) -> u8 {
    use TileObject::{Floor, Space, Wall};
    match (object, ctx.left) {
        (Space, Space) => [0x0A, 0x0A, 0x47][variant - 1],
        (Space, Wall) if ctx.left_down == Wall => ctx.by_row([0xDB, 0xE5, 0xEF]),
        (Space, Wall) => ctx.by_row([0xB1, 0xBB, 0x44]),
        (Space, Floor) if ctx.left_down == Wall => match ctx.shade {
            Shade::Blue => ctx.by_row([0xA3, 0xA2, 0xA3]),
            Shade::Brown => ctx.by_row([0xA1, 0xA0, 0xA1]),
        },
        (Space, Floor) => ctx.by_shade(0xA9, 0xA8),
        (Wall, _) => match variant {
            1 => ctx.by_row([0xD7, 0xE1, 0xEA]),
            2 => ctx.by_row([0xD9, 0xCD, 0xC0]),
            _ => ctx.by_row([0xC5, 0xB6, 0xBF]),
        },
        (Floor, Space) => ctx.by_shade(0x96, 0x97),
        (Floor, Wall) => match ctx.shade {
            Shade::Blue => ctx.by_row([0xB2, 0xBC, 0x65]),
            Shade::Brown => ctx.by_row([0xB3, 0xBD, 0x63]),
        },
        (Floor, Floor) => match variant {
            1 => ctx.by_shade(0x38, 0x39),
            2 => ctx.by_shade(0x92, 0x93),
            _ => ctx.by_shade(0x34, 0x35),
        },
        _ => 0x00,
    }
}

fn palace_graphics(object: TileObject, variant: usize, ctx: &Context) -> u8 {
    use TileObject::{Floor, Space, Wall};
    match (object, ctx.left) {
        (Space, Space) => [0x0A, 0x0A, 0x07][variant - 1],
        (Space, Wall) if ctx.left_down == Wall => 0x91,
        (Space, Wall) => 0xB8,
        (Space, Floor) if ctx.left_down == Wall => 0x7C,
        (Space, Floor) => 0x03,
        // Mixed brick colours do not line up.
        (Wall, _) => 0x65,
        (Floor, Space) => 0x0D,
        (Floor, Wall) => 0x96,
        (Floor, Floor) => [0x1B, 0x08, 0xC1][variant - 1],
        _ => 0x00,
    }
}

/// Replace every tile of `level` with random space, wall or floor.
///
/// Goes through [`LevelStore::set_tile`], so category records on replaced
/// tiles are removed. Returns the number of tiles written.
pub fn randomize_level<R: Rng>(
    store: &mut LevelStore,
    level: usize,
    rng: &mut R,
) -> Result<usize, CoreError> {
    const CHOICES: [TileObject; 3] = [TileObject::Space, TileObject::Wall, TileObject::Floor];

    let (columns, rows, level_type) = {
        let lvl = store.checked_level(level)?;
        (lvl.tile_columns(), lvl.tile_rows(), lvl.level_type())
    };
    let dungeon = level_type.is_dungeon();
    let object_at = |store: &LevelStore, x: usize, y: usize| {
        store
            .level(level)
            .and_then(|lvl| lvl.object(TilePos::new(x, y)))
            .unwrap_or(TileObject::Wall)
    };

    let mut written = 0;
    for y in (1..=rows).rev() {
        for x in 1..=columns {
            let row = match y % ROOM_TILE_HEIGHT {
                0 => ROOM_TILE_HEIGHT,
                r => r,
            };
            let shade = if x % 2 == 0 { Shade::Blue } else { Shade::Brown };
            let left = if x > 1 { object_at(store, x - 1, y) } else { TileObject::Wall };
            let down = if y < rows { object_at(store, x, y + 1) } else { TileObject::Wall };
            let left_down = if x > 1 && y < rows {
                object_at(store, x - 1, y + 1)
            } else {
                TileObject::Wall
            };

            let variant = rng.gen_range(1..=3usize);
            let object = loop {
                let pick = CHOICES[rng.gen_range(0..CHOICES.len())];
                if !(down == TileObject::Wall && pick == TileObject::Space) {
                    break pick;
                }
            };

            let ctx = Context {
                row,
                shade,
                left,
                left_down,
            };
            let graphics = if dungeon {
                dungeon_graphics(object, variant, &ctx)
            } else {
                palace_graphics(object, variant, &ctx)
            };
            store.set_tile(level, x, y, object, Some(graphics))?;
            written += 1;
        }
    }

    debug!(level, written, dungeon, "level randomized");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(row: usize, shade: Shade, left: TileObject, left_down: TileObject) -> Context {
        Context {
            row,
            shade,
            left,
            left_down,
        }
    }

    #[test]
    fn dungeon_space_next_to_wall_depends_on_row() {
        let c = ctx(2, Shade::Blue, TileObject::Wall, TileObject::Wall);
        assert_eq!(dungeon_graphics(TileObject::Space, 1, &c), 0xE5);
        let c = ctx(3, Shade::Blue, TileObject::Wall, TileObject::Floor);
        assert_eq!(dungeon_graphics(TileObject::Space, 1, &c), 0x44);
    }

    #[test]
    fn dungeon_floor_alternates_shade() {
        let blue = ctx(1, Shade::Blue, TileObject::Floor, TileObject::Floor);
        let brown = ctx(1, Shade::Brown, TileObject::Floor, TileObject::Floor);
        assert_eq!(dungeon_graphics(TileObject::Floor, 2, &blue), 0x92);
        assert_eq!(dungeon_graphics(TileObject::Floor, 2, &brown), 0x93);
    }

    #[test]
    fn palace_walls_use_one_brick() {
        for variant in 1..=3 {
            let c = ctx(variant, Shade::Brown, TileObject::Space, TileObject::Wall);
            assert_eq!(palace_graphics(TileObject::Wall, variant, &c), 0x65);
        }
    }

    #[test]
    fn unknown_left_neighbour_gives_blank_graphics() {
        let c = ctx(1, Shade::Blue, TileObject::Gate, TileObject::Wall);
        assert_eq!(dungeon_graphics(TileObject::Space, 1, &c), 0x00);
        assert_eq!(palace_graphics(TileObject::Floor, 1, &c), 0x00);
    }
}
