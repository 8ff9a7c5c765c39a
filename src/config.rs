use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GraderError, Result};

/// Environment variable overriding the hash table size.
pub const MAP_BITS_ENV: &str = "LXRBITSIZE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub seed: u64,
    pub map_size_bits: u32,
    pub passes: u32,
    /// Digest length in bytes.
    pub hash_size: usize,
    /// Raw table cache. Loaded when present, written after generation otherwise.
    pub table_path: Option<PathBuf>,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            seed: 0xfafa_ecec_fafa_ecec,
            map_size_bits: 30, // 1 GiB table
            passes: 5,
            hash_size: 32,
            table_path: None,
        }
    }
}

impl HashConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8..=30).contains(&self.map_size_bits) {
            return Err(GraderError::InvalidConfig(format!(
                "map_size_bits must be within 8..=30, got {}",
                self.map_size_bits
            )));
        }

        if self.hash_size < 8 {
            return Err(GraderError::InvalidConfig(
                "hash_size must be at least 8 bytes".to_string(),
            ));
        }

        if self.passes == 0 {
            return Err(GraderError::InvalidConfig("passes must be > 0".to_string()));
        }

        Ok(())
    }

    /// Apply `LXRBITSIZE` if it holds a usable table size.
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(MAP_BITS_ENV) {
            self.apply_map_bits_override(&raw);
        }
    }

    fn apply_map_bits_override(&mut self, raw: &str) {
        match raw.trim().parse::<u32>() {
            Ok(bits) if (8..=30).contains(&bits) => {
                log::info!("Using {}={} for the hash table", MAP_BITS_ENV, bits);
                self.map_size_bits = bits;
            }
            _ => log::warn!("Ignoring {}={:?}: expected 8..=30", MAP_BITS_ENV, raw),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub hash: HashConfig,
    /// Tournament window used by `grade()`. Raised to the winner amount when smaller.
    pub default_cutoff: usize,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            default_cutoff: 50,
        }
    }
}

impl GraderConfig {
    pub fn mainnet() -> Self {
        Self::default()
    }

    /// Small hash table for tests and local tooling. Not consensus compatible.
    pub fn unit_test() -> Self {
        let mut config = Self::default();
        config.hash.map_size_bits = 10;
        config
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.hash.validate()?;

        if self.default_cutoff == 0 {
            return Err(GraderError::InvalidConfig(
                "default_cutoff must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
