use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Data directory: `$TALLY_HOME`, else `~/.tally`.
pub fn tally_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set (or set TALLY_HOME)")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where the key-value records live.
pub fn data_dir() -> Result<PathBuf> {
    let dir = ensure_tally_home()?.join("data");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
