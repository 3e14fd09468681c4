//! Engine construction options.
//!
//! The configuration is serializable so it can be loaded from JSON or TOML
//! alongside the beacon layout and bucket scheme it applies to.

use crate::error::{MultilatError, Result};
use serde::{Deserialize, Serialize};

/// Options used when building a [`Multilat`](crate::Multilat) engine.
///
/// # Example
///
/// ```rust
/// use multilat::Config;
///
/// let config = Config::default().with_num_points(40_000);
/// assert_eq!(config.num_points, 40_000);
///
/// let json = r#"{ "num_points": 10000, "parallel_build": false }"#;
/// let config = Config::from_json(json).unwrap();
/// assert!(!config.parallel_build);
/// assert!(config.warn_uncovered);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target number of grid points. The grid uses `floor(sqrt(n))^2` of them.
    #[serde(default = "Config::default_num_points")]
    pub num_points: usize,

    /// Build the beacon-bucket index on the rayon pool (requires the `parallel` feature)
    #[serde(default = "Config::default_parallel_build")]
    pub parallel_build: bool,

    /// Log a warning when grid points fall outside every configured bucket
    #[serde(default = "Config::default_warn_uncovered")]
    pub warn_uncovered: bool,
}

impl Config {
    /// Smallest target that still yields a 2x2 lattice.
    pub const MIN_POINTS: usize = 4;

    const fn default_num_points() -> usize {
        100_000
    }

    const fn default_parallel_build() -> bool {
        true
    }

    const fn default_warn_uncovered() -> bool {
        true
    }

    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    pub fn with_parallel_build(mut self, parallel: bool) -> Self {
        self.parallel_build = parallel;
        self
    }

    pub fn with_warn_uncovered(mut self, warn: bool) -> Self {
        self.warn_uncovered = warn;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.num_points < Self::MIN_POINTS {
            return Err(MultilatError::GridTooSmall {
                requested: self.num_points,
            });
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| MultilatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MultilatError::Config(e.to_string()))
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| MultilatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MultilatError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_points: Self::default_num_points(),
            parallel_build: Self::default_parallel_build(),
            warn_uncovered: Self::default_warn_uncovered(),
        }
    }
}
