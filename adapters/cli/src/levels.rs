use std::{fs, path::Path};

use anyhow::{Context, Result};
use infiltration_core::LevelConfig;

use crate::level_transfer;

const BUILTIN_LEVEL: &str = include_str!("../../../levels/compound.toml");

/// Where the level of a run comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LevelSource<'a> {
    /// TOML file on disk.
    File(&'a Path),
    /// Share code produced by `--export-code`.
    Code(&'a str),
    /// Level bundled with the binary.
    Builtin,
}

/// Loads and validates the level described by `source`.
pub(crate) fn load(source: LevelSource<'_>) -> Result<LevelConfig> {
    let level = match source {
        LevelSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read level file {}", path.display()))?;
            parse_toml(&text)
                .with_context(|| format!("failed to parse level file {}", path.display()))?
        }
        LevelSource::Code(code) => {
            level_transfer::decode(code).context("failed to decode level code")?
        }
        LevelSource::Builtin => parse_toml(BUILTIN_LEVEL).context("built-in level is invalid")?,
    };

    level.validate().context("level failed validation")?;
    Ok(level)
}

fn parse_toml(text: &str) -> Result<LevelConfig> {
    Ok(toml::from_str(text)?)
}
