//! Startup configuration errors.
//!
//! These are raised once, while content tables are validated. Nothing in the
//! per-tick path returns them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse content tables: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {table} key '{key}'")]
    DuplicateKey { table: &'static str, key: String },

    #[error("'{owner}': unknown behavior tag '{tag}'")]
    UnknownBehavior { owner: String, tag: String },

    #[error("'{referenced_by}': unknown enemy archetype '{key}'")]
    UnknownArchetype { key: String, referenced_by: String },

    #[error("'{referenced_by}': unknown ability '{key}'")]
    UnknownAbility { key: String, referenced_by: String },

    #[error("'{referenced_by}': unknown boss '{key}'")]
    UnknownBoss { key: String, referenced_by: String },

    #[error("'{referenced_by}': unknown power-up '{key}'")]
    UnknownPowerUp { key: String, referenced_by: String },

    #[error("'{referenced_by}': unknown hazard '{key}'")]
    UnknownHazard { key: String, referenced_by: String },

    #[error("boss '{boss}': malformed attack pool: {reason}")]
    MalformedAttackPool { boss: String, reason: String },

    #[error("'{key}': invalid {field}: {reason}")]
    InvalidValue {
        key: String,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            field,
            reason: reason.into(),
        }
    }

    /// The content key the error is about, when it names one.
    pub fn offending_key(&self) -> Option<&str> {
        match self {
            ConfigError::Parse(_) => None,
            ConfigError::DuplicateKey { key, .. }
            | ConfigError::UnknownArchetype { key, .. }
            | ConfigError::UnknownAbility { key, .. }
            | ConfigError::UnknownBoss { key, .. }
            | ConfigError::UnknownPowerUp { key, .. }
            | ConfigError::UnknownHazard { key, .. }
            | ConfigError::InvalidValue { key, .. } => Some(key.as_str()),
            ConfigError::UnknownBehavior { tag, .. } => Some(tag.as_str()),
            ConfigError::MalformedAttackPool { boss, .. } => Some(boss.as_str()),
        }
    }
}
