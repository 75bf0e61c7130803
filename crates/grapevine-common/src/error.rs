//! Error types for Grapevine.

use thiserror::Error;

/// Top-level error type for Grapevine operations.
#[derive(Debug, Error)]
pub enum GrapevineError {
    /// Spawn or template configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller broke a contract of the core (e.g. ticking a dead character)
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Configuration errors raised while validating templates or spawning.
///
/// A spawn that fails with one of these never produces a partial character.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No template registered under this name
    #[error("Unknown spawn template: {0}")]
    UnknownTemplate(String),

    /// A required attribute is absent or empty
    #[error("Template '{template}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Template or hero name
        template: String,
        /// Attribute name
        attribute: &'static str,
    },

    /// An attribute is present but out of range
    #[error("Template '{template}' has invalid {attribute}: {reason}")]
    InvalidAttribute {
        /// Template or hero name
        template: String,
        /// Attribute name
        attribute: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Two templates share a name
    #[error("Duplicate spawn template: {0}")]
    DuplicateTemplate(String),

    /// A hero with this name is already on the roster
    #[error("Duplicate hero: {0}")]
    DuplicateHero(String),

    /// The active hero named in the configuration was never spawned
    #[error("Unknown hero: {0}")]
    UnknownHero(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for Grapevine operations.
pub type GrapevineResult<T> = Result<T, GrapevineError>;
