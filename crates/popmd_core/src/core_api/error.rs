use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    NotARom,
    UnknownRegion,
    QuotaExceeded,
    InvalidInput,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::InvalidInput, message)
    }
}

impl From<io::Error> for CoreError {
    fn from(err: io::Error) -> Self {
        Self::new(CoreErrorCode::Io, err.to_string())
    }
}
