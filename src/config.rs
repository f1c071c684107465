//! TOML configuration: RNG seed, tile rules and display options.

use std::io::Read;
use std::path::Path;

use crate::engine::CELLS;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tile-spawning rules for a game.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Rules {
    /// Probability that a spawned tile is a 4 rather than a 2.
    #[serde(default = "defaults::four_probability")]
    pub four_probability: f64,
    /// Tiles placed on a fresh grid.
    #[serde(default = "defaults::initial_tiles")]
    pub initial_tiles: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self { four_probability: defaults::four_probability(), initial_tiles: defaults::initial_tiles() }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.four_probability.is_finite() || !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::Invalid(format!(
                "rules.four_probability must be within [0, 1], got {}",
                self.four_probability
            )));
        }
        if self.initial_tiles > CELLS {
            return Err(ConfigError::Invalid(format!(
                "rules.initial_tiles must be at most {CELLS}, got {}",
                self.initial_tiles
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct DisplayOptions {
    /// Paint tiles with the value palette; plain text otherwise.
    #[serde(default = "defaults::color")]
    pub color: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { color: defaults::color() }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    /// Fixed RNG seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub display: DisplayOptions,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.rules.validate()?;
        Ok(cfg)
    }
}

mod defaults {
    use crate::engine::DEFAULT_FOUR_PROBABILITY;

    pub fn four_probability() -> f64 { DEFAULT_FOUR_PROBABILITY }
    pub fn initial_tiles() -> usize { 2 }
    pub fn color() -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rules.four_probability, 0.1);
        assert_eq!(cfg.rules.initial_tiles, 2);
        assert!(cfg.display.color);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let cfg = Config::from_toml_str("seed = 7\n[rules]\nfour_probability = 0.25\n").unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.rules.four_probability, 0.25);
        assert_eq!(cfg.rules.initial_tiles, 2);
        assert!(cfg.display.color);
    }

    #[test]
    fn rejects_bad_probability() {
        let err = Config::from_toml_str("[rules]\nfour_probability = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Config::from_toml_str("[rules]\nfour_probability = nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_too_many_initial_tiles() {
        let err = Config::from_toml_str("[rules]\ninitial_tiles = 5\n").unwrap_err();
        assert!(err.to_string().contains("initial_tiles"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Config::from_toml_str("[rules\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "seed = 99\n[display]\ncolor = false").unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.seed, Some(99));
        assert!(!cfg.display.color);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_toml("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
