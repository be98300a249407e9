//! Error types
//!
//! Decision paths never fail; these cover the fallible edges around them:
//! configuration files, memory persistence and host collaborators.

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors that can occur while saving or restoring decision memory.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed decision record for {agent}: {source}")]
    Record {
        agent: String,
        #[source]
        source: ParseRecordError,
    },
    #[error("malformed cooldown key: '{0}'")]
    CooldownKey(String),
}

/// Error parsing a `year_dayOfYear_label` decision record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRecordError {
    #[error("expected 'year_day_label', got '{0}'")]
    Format(String),
    #[error("invalid year in '{0}'")]
    Year(String),
    #[error("invalid day of year in '{0}'")]
    Day(String),
}

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("battle '{0}' is not available")]
    BattleUnavailable(String),
    #[error("agent '{0}' cannot be placed in a battle")]
    CombatantRejected(String),
    #[error("host integration failed: {0}")]
    Integration(String),
}
