use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneId {
    Graphics(usize),
    Objects(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub id: PlaneId,
    pub range: ByteRange,
}

/// Placement of every level's planes in the shared tile block.
#[derive(Debug, Clone)]
pub struct TileBlockLayout {
    pub base: u64,
    pub planes: Vec<PlaneLayout>,
}

impl TileBlockLayout {
    /// Pack levels back to back, graphics before objects, from `base`.
    /// `tile_counts` holds each level's tile count in level order.
    pub fn packed(base: u64, tile_counts: &[usize]) -> Self {
        let mut planes = Vec::with_capacity(tile_counts.len() * 2);
        let mut offset = base;
        for (index, &tiles) in tile_counts.iter().enumerate() {
            let level = index + 1;
            let tiles = tiles as u64;
            planes.push(PlaneLayout {
                id: PlaneId::Graphics(level),
                range: ByteRange {
                    start: offset,
                    end: offset + tiles,
                },
            });
            planes.push(PlaneLayout {
                id: PlaneId::Objects(level),
                range: ByteRange {
                    start: offset + tiles,
                    end: offset + 2 * tiles,
                },
            });
            offset += 2 * tiles;
        }
        Self { base, planes }
    }

    pub fn graphics(&self, level: usize) -> Option<ByteRange> {
        self.find(PlaneId::Graphics(level))
    }

    pub fn objects(&self, level: usize) -> Option<ByteRange> {
        self.find(PlaneId::Objects(level))
    }

    fn find(&self, id: PlaneId) -> Option<ByteRange> {
        self.planes.iter().find(|p| p.id == id).map(|p| p.range)
    }

    pub fn end(&self) -> u64 {
        self.planes.last().map(|p| p.range.end).unwrap_or(self.base)
    }

    pub fn validate(&self) -> io::Result<()> {
        let mut expected = self.base;
        for plane in &self.planes {
            if plane.range.start != expected {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "tile block gap/overlap around {:?}: expected start 0x{:X}, got 0x{:X}",
                        plane.id, expected, plane.range.start
                    ),
                ));
            }
            if plane.range.end < plane.range.start {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "invalid plane range {:?}: 0x{:X}..0x{:X}",
                        plane.id, plane.range.start, plane.range.end
                    ),
                ));
            }
            expected = plane.range.end;
        }
        Ok(())
    }
}
