//! Configuration for the spell engine.

use serde::{Deserialize, Serialize};
use spell_common::BoundingBox;
use tracing::debug;

use crate::error::{Result, SpellError};
use crate::types::{LeadInPolicy, SpellType, WindowLength};

/// Configuration for a spell-duration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellConfig {
    /// Classification window in days (5 or 10).
    pub window_length: usize,

    /// Output for days without a full window.
    pub lead_in: LeadInPolicy,

    /// Spell types to composite.
    pub spell_types: Vec<SpellType>,

    /// Process spatial tiles on the rayon pool.
    pub parallel: bool,

    /// Rows per spatial tile (0 = derive from thread count).
    pub tile_rows: usize,

    /// Optional area of interest applied before flagging.
    pub bbox: Option<BoundingBox>,
}

impl Default for SpellConfig {
    fn default() -> Self {
        Self {
            window_length: 5,
            lead_in: LeadInPolicy::Fill,
            spell_types: SpellType::ALL.to_vec(),
            parallel: true,
            tile_rows: 0,
            bbox: None,
        }
    }
}

impl SpellConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Override fields from environment variables that are set.
    ///
    /// A variable that is set but does not parse is an error naming it.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// [`with_env`](Self::with_env) over an arbitrary variable lookup.
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(val) = var("SPELL_WINDOW_LENGTH") {
            let days: usize = val.trim().parse().map_err(|_| {
                SpellError::config(format!("SPELL_WINDOW_LENGTH: '{val}' is not a day count"))
            })?;
            WindowLength::try_from(days)?;
            self.window_length = days;
        }

        if let Some(val) = var("SPELL_LEAD_IN") {
            self.lead_in = val
                .parse()
                .map_err(|e| SpellError::config(format!("SPELL_LEAD_IN: {e}")))?;
        }

        if let Some(val) = var("SPELL_TYPES") {
            let types = parse_spell_types(&val)
                .map_err(|e| SpellError::config(format!("SPELL_TYPES: {e}")))?;
            if types.is_empty() {
                return Err(SpellError::config("SPELL_TYPES: no spell type given"));
            }
            self.spell_types = types;
        }

        if let Some(val) = var("SPELL_PARALLEL") {
            self.parallel = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => {
                    return Err(SpellError::config(format!(
                        "SPELL_PARALLEL: '{val}' is not a boolean"
                    )))
                }
            };
        }

        if let Some(val) = var("SPELL_TILE_ROWS") {
            self.tile_rows = val.trim().parse().map_err(|_| {
                SpellError::config(format!("SPELL_TILE_ROWS: '{val}' is not a row count"))
            })?;
        }

        if let Some(val) = var("SPELL_BBOX") {
            let bbox = BoundingBox::from_csv(&val)
                .map_err(|e| SpellError::config(format!("SPELL_BBOX: {e}")))?;
            self.bbox = Some(bbox);
        }

        debug!(window = self.window_length, lead_in = %self.lead_in, "Applied environment");
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        WindowLength::try_from(self.window_length)?;

        if self.spell_types.is_empty() {
            return Err(SpellError::config("spell_types must not be empty"));
        }

        for (i, spell) in self.spell_types.iter().enumerate() {
            if self.spell_types[..i].contains(spell) {
                return Err(SpellError::config(format!(
                    "spell_types lists {spell} more than once"
                )));
            }
        }

        Ok(())
    }

    /// The validated window.
    pub fn window(&self) -> Result<WindowLength> {
        WindowLength::try_from(self.window_length)
    }
}

/// Parse a comma separated spell type list, e.g. "warm,cold".
pub fn parse_spell_types(s: &str) -> Result<Vec<SpellType>> {
    let mut types = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let spell: SpellType = part.parse()?;
        if !types.contains(&spell) {
            types.push(spell);
        }
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpellConfig::default();
        assert_eq!(config.window_length, 5);
        assert_eq!(config.lead_in, LeadInPolicy::Fill);
        assert_eq!(config.spell_types, vec![SpellType::Warm, SpellType::Cold]);
        assert!(config.parallel);
        assert_eq!(config.tile_rows, 0);
        assert!(config.bbox.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SpellConfig {
            window_length: 7,
            ..SpellConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            SpellError::InvalidWindowLength(7)
        );

        config.window_length = 10;
        assert!(config.validate().is_ok());
        assert_eq!(config.window().unwrap(), WindowLength::Ten);

        config.spell_types.clear();
        assert!(matches!(config.validate(), Err(SpellError::Config(_))));
    }

    #[test]
    fn test_parse_spell_types() {
        assert_eq!(
            parse_spell_types("cold, warm,cold").unwrap(),
            vec![SpellType::Cold, SpellType::Warm]
        );
        assert!(parse_spell_types("warm,hot").is_err());
        assert!(parse_spell_types("").unwrap().is_empty());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: SpellConfig =
            serde_json::from_str(r#"{"window_length": 10, "lead_in": "omit"}"#).unwrap();
        assert_eq!(config.window_length, 10);
        assert_eq!(config.lead_in, LeadInPolicy::Omit);
        assert_eq!(config.spell_types.len(), 2);
        assert!(config.parallel);
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_env_overrides_applied() {
        let config = SpellConfig::default()
            .with_vars(vars(&[
                ("SPELL_WINDOW_LENGTH", "10"),
                ("SPELL_LEAD_IN", "omit"),
                ("SPELL_TYPES", "cold"),
                ("SPELL_PARALLEL", "no"),
                ("SPELL_TILE_ROWS", "16"),
                ("SPELL_BBOX", "-10.4,44.8,10.4,65.6"),
            ]))
            .unwrap();

        assert_eq!(config.window_length, 10);
        assert_eq!(config.lead_in, LeadInPolicy::Omit);
        assert_eq!(config.spell_types, vec![SpellType::Cold]);
        assert!(!config.parallel);
        assert_eq!(config.tile_rows, 16);
        assert_eq!(config.bbox, Some(BoundingBox::new(-10.4, 44.8, 10.4, 65.6)));
    }

    #[test]
    fn test_env_unset_keeps_lower_layer() {
        let base = SpellConfig {
            window_length: 10,
            ..SpellConfig::default()
        };
        assert_eq!(base.clone().with_vars(|_| None).unwrap(), base);
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        let cases = [
            ("SPELL_WINDOW_LENGTH", "seven"),
            ("SPELL_LEAD_IN", "sometimes"),
            ("SPELL_TYPES", "warm,hot"),
            ("SPELL_TYPES", " , "),
            ("SPELL_PARALLEL", "maybe"),
            ("SPELL_TILE_ROWS", "-1"),
            ("SPELL_BBOX", "10,0,5,1"),
        ];
        for (name, value) in cases {
            let err = SpellConfig::default()
                .with_vars(vars(&[(name, value)]))
                .unwrap_err();
            match &err {
                SpellError::Config(msg) => assert!(msg.contains(name), "{name}: {msg}"),
                other => panic!("{name}={value}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_env_window_outside_rules() {
        let err = SpellConfig::default()
            .with_vars(vars(&[("SPELL_WINDOW_LENGTH", "7")]))
            .unwrap_err();
        assert_eq!(err, SpellError::InvalidWindowLength(7));
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        // only this test touches SPELL_* in this binary
        std::env::set_var("SPELL_WINDOW_LENGTH", "seven");
        std::env::set_var("SPELL_TYPES", "warm,hot");
        let bad = SpellConfig::from_env();
        std::env::set_var("SPELL_WINDOW_LENGTH", "10");
        std::env::set_var("SPELL_TYPES", "warm");
        let good = SpellConfig::from_env();
        std::env::remove_var("SPELL_WINDOW_LENGTH");
        std::env::remove_var("SPELL_TYPES");

        assert!(matches!(bad, Err(SpellError::Config(_))));
        let good = good.unwrap();
        assert_eq!(good.window_length, 10);
        assert_eq!(good.spell_types, vec![SpellType::Warm]);
    }

    #[test]
    fn test_duplicate_spell_types_rejected() {
        let config: SpellConfig =
            serde_json::from_str(r#"{"spell_types": ["warm", "warm"]}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err, SpellError::config("spell_types lists warm more than once"));
    }
}
