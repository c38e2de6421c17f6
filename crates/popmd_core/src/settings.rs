//! Game start parameters stored as engine code constants.

use std::io::{Read, Seek, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{BigEndianReader, BigEndianWriter};
use crate::core_api::CoreError;
use crate::region::RegionProfile;

/// Starting time, hit points and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub minutes: u32,
    pub seconds: u32,
    pub hit_points: u32,
    /// 1-based.
    pub start_level: u32,
}

impl GameSettings {
    /// Timer value in frames, as the engine counts it.
    pub fn frames(&self, fps: u32) -> u32 {
        self.minutes
            .wrapping_mul(60)
            .wrapping_add(self.seconds)
            .wrapping_mul(fps)
            .wrapping_sub(1)
    }
}

pub fn load_settings<R: Read + Seek>(
    reader: R,
    profile: &RegionProfile,
) -> Result<GameSettings, CoreError> {
    let offsets = &profile.settings;
    let mut r = BigEndianReader::new(reader);

    let frames = r.read_u32_at(offsets.starting_time)?;
    let time = frames.wrapping_add(1) / offsets.frames_per_second;
    let hit_points = r.read_u8_at(offsets.starting_hit_points)? as u32;
    let start_level = r.read_u8_at(offsets.starting_level)? as u32 + 1;

    Ok(GameSettings {
        minutes: time / 60,
        seconds: time % 60,
        hit_points,
        start_level,
    })
}

pub fn save_settings<W: Write + Seek>(
    writer: W,
    profile: &RegionProfile,
    settings: &GameSettings,
) -> Result<W, CoreError> {
    let offsets = &profile.settings;
    let mut w = BigEndianWriter::new(writer);

    w.write_u32_at(
        offsets.starting_time,
        settings.frames(offsets.frames_per_second),
    )?;
    w.write_u8_at(offsets.starting_hit_points, settings.hit_points)?;
    w.write_u8_at(offsets.starting_level, settings.start_level.wrapping_sub(1))?;
    w.flush()?;
    debug!(?settings, "game settings written");
    Ok(w.into_inner())
}

/// Temporarily boots the game straight into one level.
///
/// `apply` remembers the stored start level; `restore` writes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOverride {
    previous: u32,
}

impl StartOverride {
    pub fn apply<S: Read + Write + Seek>(
        rom: &mut S,
        profile: &RegionProfile,
        level: u32,
    ) -> Result<Self, CoreError> {
        let offset = profile.settings.starting_level;
        let previous = BigEndianReader::new(&mut *rom).read_u8_at(offset)? as u32 + 1;
        let mut w = BigEndianWriter::new(&mut *rom);
        w.write_u8_at(offset, level.wrapping_sub(1))?;
        w.flush()?;
        debug!(previous, level, "start level overridden");
        Ok(Self { previous })
    }

    pub fn previous(&self) -> u32 {
        self.previous
    }

    pub fn restore<S: Write + Seek>(self, rom: &mut S, profile: &RegionProfile) -> Result<(), CoreError> {
        let mut w = BigEndianWriter::new(rom);
        w.write_u8_at(profile.settings.starting_level, self.previous.wrapping_sub(1))?;
        w.flush()?;
        debug!(level = self.previous, "start level restored");
        Ok(())
    }
}
