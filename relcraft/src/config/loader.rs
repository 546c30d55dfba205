//! Reading relcraft.toml

use axoasset::SourceFile;
use camino::Utf8Path;
use tracing::debug;

use crate::config::ConfigLayer;
use crate::errors::RelResult;

/// Loads a relcraft.toml from disk.
pub fn load(config_path: &Utf8Path) -> RelResult<ConfigLayer> {
    let src = SourceFile::load_local(config_path)?;
    parse(src)
}

/// Loads a relcraft.toml from disk, if there is one.
pub fn load_if_present(config_path: &Utf8Path) -> RelResult<Option<ConfigLayer>> {
    if !config_path.exists() {
        debug!("no config at {config_path}, using defaults");
        return Ok(None);
    }
    load(config_path).map(Some)
}

/// Given a SourceFile of a relcraft.toml, deserializes it.
pub fn parse(src: SourceFile) -> RelResult<ConfigLayer> {
    Ok(src.deserialize_toml()?)
}
