//! Layout configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DEFAULT_CHAR_ADVANCE, DEFAULT_LINE_HEIGHT, DEFAULT_LINE_WIDTH};

pub const ENV_LINE_WIDTH: &str = "FOLIO_LINE_WIDTH";
pub const ENV_CHAR_ADVANCE: &str = "FOLIO_CHAR_ADVANCE";
pub const ENV_LINE_HEIGHT: &str = "FOLIO_LINE_HEIGHT";
pub const ENV_MAX_LINES: &str = "FOLIO_MAX_LINES";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Parse { var: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Maximum width of one line in document units.
    pub line_width_budget: f64,
    /// Fixed advance of every character.
    pub char_advance: f64,
    /// Height of one row, used to map highlights onto lines.
    pub line_height: f64,
    /// Window applied by callers on top of layout output.
    pub max_lines: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_width_budget: DEFAULT_LINE_WIDTH,
            char_advance: DEFAULT_CHAR_ADVANCE,
            line_height: DEFAULT_LINE_HEIGHT,
            max_lines: None,
        }
    }
}

impl LayoutConfig {
    /// Build and validate config from the process environment.
    ///
    /// Optional:
    /// - `FOLIO_LINE_WIDTH`: default 1200
    /// - `FOLIO_CHAR_ADVANCE`: default 24
    /// - `FOLIO_LINE_HEIGHT`: default 36
    /// - `FOLIO_MAX_LINES`: no cap when absent
    ///
    /// # Errors
    ///
    /// Returns `Parse` for an unparseable value and `Invalid` for a
    /// non-positive width, advance or height.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Parse the environment without validating, for callers that layer
    /// their own overrides on top and validate the merged result.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for an unparseable value.
    pub fn parse_env() -> Result<Self, ConfigError> {
        Self::parse_lookup(env_var)
    }

    /// Build and validate config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`LayoutConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self::parse_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from an arbitrary key lookup. Absent keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for an unparseable value.
    pub fn parse_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            line_width_budget: parse_var(&lookup, ENV_LINE_WIDTH)?.unwrap_or(defaults.line_width_budget),
            char_advance: parse_var(&lookup, ENV_CHAR_ADVANCE)?.unwrap_or(defaults.char_advance),
            line_height: parse_var(&lookup, ENV_LINE_HEIGHT)?.unwrap_or(defaults.line_height),
            max_lines: parse_var(&lookup, ENV_MAX_LINES)?,
        })
    }

    /// Check every dimension is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` naming the first bad dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = [
            ("line width", self.line_width_budget),
            ("char advance", self.char_advance),
            ("line height", self.line_height),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(ConfigError::Parse { var, value: raw }),
        },
    }
}
