use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core_api::CoreError;

/// Default backup path: the ROM path with `.bak` appended.
pub fn default_backup_path(rom: &Path) -> PathBuf {
    let mut name = rom.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Byte-for-byte copy of `rom` to `backup`, replacing any older backup.
pub fn create_backup(rom: &Path, backup: &Path) -> Result<u64, CoreError> {
    let copied = fs::copy(rom, backup)?;
    info!(from = %rom.display(), to = %backup.display(), bytes = copied, "backup written");
    Ok(copied)
}
