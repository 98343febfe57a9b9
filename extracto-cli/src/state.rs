use anyhow::{Context, Result};
use std::path::PathBuf;

/// `~/.extracto`, created on demand by `config init`
pub fn extracto_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".extracto"))
}
