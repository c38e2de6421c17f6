use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
    Unknown(u16),
}

impl Facing {
    pub const LEFT_RAW: u16 = 0x0000;
    pub const RIGHT_RAW: u16 = 0x0800;

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            Self::LEFT_RAW => Self::Left,
            Self::RIGHT_RAW => Self::Right,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            Self::Left => Self::LEFT_RAW,
            Self::Right => Self::RIGHT_RAW,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Left => "l",
            Self::Right => "r",
            Self::Unknown(_) => "?",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "? (0x{v:04X})"),
            _ => f.write_str(self.as_str()),
        }
    }
}
