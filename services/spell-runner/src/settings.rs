//! Run configuration: YAML file, then environment, then command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use spell_common::BoundingBox;
use spell_engine::{LeadInPolicy, SpellConfig, SpellType};
use tracing::{debug, info};

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub window_length: Option<usize>,
    pub lead_in: Option<LeadInPolicy>,
    pub spell_types: Vec<SpellType>,
    pub bbox: Option<BoundingBox>,
    pub tile_rows: Option<usize>,
    pub sequential: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: SpellConfig) -> SpellConfig {
        if let Some(window) = self.window_length {
            config.window_length = window;
        }
        if let Some(lead_in) = self.lead_in {
            config.lead_in = lead_in;
        }
        if !self.spell_types.is_empty() {
            config.spell_types = dedup(&self.spell_types);
        }
        if let Some(bbox) = self.bbox {
            config.bbox = Some(bbox);
        }
        if let Some(rows) = self.tile_rows {
            config.tile_rows = rows;
        }
        if self.sequential {
            config.parallel = false;
        }
        config
    }
}

fn dedup(types: &[SpellType]) -> Vec<SpellType> {
    let mut out = Vec::with_capacity(types.len());
    for &spell in types {
        if !out.contains(&spell) {
            out.push(spell);
        }
    }
    out
}

/// Load a YAML configuration file.
pub fn load_file(path: &Path) -> Result<SpellConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: SpellConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Resolve and validate the effective configuration.
pub fn resolve(config_file: Option<&Path>, overrides: &Overrides) -> Result<SpellConfig> {
    let base = match config_file {
        Some(path) => load_file(path)?,
        None => SpellConfig::default(),
    };
    let base = base
        .with_env()
        .context("Invalid spell configuration in environment")?;
    let config = overrides.apply(base);
    config.validate().context("Invalid spell configuration")?;

    info!(
        window = config.window_length,
        lead_in = %config.lead_in,
        spell_types = ?config.spell_types,
        parallel = config.parallel,
        bbox = ?config.bbox,
        "Resolved configuration"
    );
    Ok(config)
}
