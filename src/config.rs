//! Configuration management for minichain

use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Units minted to the miner of every block.
pub const MINING_REWARD: u64 = 50;
/// Leading `'0'` hex characters a block hash needs.
pub const DIFFICULTY: usize = 3;
/// Units minted to the genesis account.
pub const GENESIS_AMOUNT: u64 = 1000;
/// A SHA-256 hex digest has 64 characters.
pub const MAX_DIFFICULTY: usize = 64;

/// Top-level layout of `config.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    chain: ChainConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_genesis_amount")]
    pub genesis_amount: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            mining_reward: MINING_REWARD,
            difficulty: DIFFICULTY,
            genesis_amount: GENESIS_AMOUNT,
        }
    }
}

impl ChainConfig {
    /// Parses the `[chain]` table of a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(config_str)?;
        file.chain.validate()?;
        Ok(file.chain)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::ConfigError(format!(
                "chain.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.difficulty
            )));
        }
        Ok(())
    }
}

/// Loads the chain configuration from `path`, using defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<ChainConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(ChainConfig::default());
    }
    let config_str = fs::read_to_string(path)?;
    ChainConfig::from_toml_str(&config_str)
}

fn default_mining_reward() -> u64 {
    MINING_REWARD
}

fn default_difficulty() -> usize {
    DIFFICULTY
}

fn default_genesis_amount() -> u64 {
    GENESIS_AMOUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.mining_reward, 50);
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.genesis_amount, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ChainConfig::from_toml_str("[chain]\ndifficulty = 2\n").unwrap();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.mining_reward, MINING_REWARD);
        assert_eq!(config.genesis_amount, GENESIS_AMOUNT);

        assert_eq!(ChainConfig::from_toml_str("").unwrap(), ChainConfig::default());
    }

    #[test]
    fn test_difficulty_bound() {
        let err = ChainConfig::from_toml_str("[chain]\ndifficulty = 65\n").unwrap_err();
        assert!(matches!(err, ChainError::ConfigError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ChainConfig::from_toml_str("[chain]\nmining_reward = \"lots\"\n").unwrap_err();
        assert!(matches!(err, ChainError::ConfigError(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[chain]\nmining_reward = 25\ngenesis_amount = 5000").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.mining_reward, 25);
        assert_eq!(config.genesis_amount, 5000);
        assert_eq!(config.difficulty, DIFFICULTY);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ChainConfig::default());
    }
}
