//! Error types for League Analytics

use crate::types::{RosterId, SeasonId};
use thiserror::Error;

/// Result type for League Analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors raised at the crate's fallible edges (files, config, lookups).
/// The engines themselves never fail.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Season not found: {0}")]
    SeasonNotFound(SeasonId),

    #[error("Roster not found: {0}")]
    RosterNotFound(RosterId),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("No current season in snapshot")]
    NoCurrentSeason,
}
