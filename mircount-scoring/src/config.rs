use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mircount_core::consts::{DEFAULT_FLANK, DEFAULT_NAME_KEY, UNALIGNED_REFERENCE};
use mircount_overlaprs::IndexParams;

///
/// Settings shared by both counting modes. Every field is optional in the
/// TOML file; missing ones take their defaults.
///
/// ```toml
/// flank = 5
/// name_key = "Name"
/// seed = 42
/// threads = 4
/// unaligned_marker = "*"
/// ```
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct CountingConfig {
    pub flank: i64,
    pub name_key: String,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub unaligned_marker: String,
}

impl Default for CountingConfig {
    fn default() -> Self {
        CountingConfig {
            flank: DEFAULT_FLANK,
            name_key: DEFAULT_NAME_KEY.to_string(),
            seed: None,
            threads: None,
            unaligned_marker: UNALIGNED_REFERENCE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CountingConfigError {
    #[error("Flank must not be negative, got {0}")]
    NegativeFlank(i64),
    #[error("Thread count must be at least 1")]
    NoThreads,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type CountingConfigResult<T> = std::result::Result<T, CountingConfigError>;

impl CountingConfig {
    pub fn validate(&self) -> CountingConfigResult<()> {
        if self.flank < 0 {
            return Err(CountingConfigError::NegativeFlank(self.flank));
        }
        if self.threads == Some(0) {
            return Err(CountingConfigError::NoThreads);
        }
        Ok(())
    }

    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            flank: self.flank,
            name_key: self.name_key.clone(),
        }
    }
}

impl TryFrom<&Path> for CountingConfig {
    type Error = CountingConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: CountingConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
