//! Error types for minichain

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid transaction signature")]
    InvalidSignature,
    #[error("Insufficient balance: account {account} holds {balance}, needs {amount}")]
    InsufficientBalance {
        account: String,
        balance: i128,
        amount: u64,
    },
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
    #[error("Invalid block linkage")]
    InvalidBlockLinkage,
    #[error("Invalid proof of work")]
    InvalidProofOfWork,
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
    #[error("Balance mismatch: {0}")]
    BalanceMismatch(String),
    #[error("Mining cancelled")]
    MiningCancelled,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
