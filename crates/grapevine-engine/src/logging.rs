//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` does not say otherwise.
pub const DEFAULT_DIRECTIVE: &str = "grapevine=info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The default directive does not parse
    #[error("Invalid log directive: {0}")]
    Directive(#[from] ParseError),

    /// A global subscriber is already installed
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Installs a formatting subscriber filtered by `RUST_LOG` plus
/// `default_directive`.
pub fn init_tracing(default_directive: &str) -> Result<(), LoggingError> {
    let directive: Directive = default_directive.parse()?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(directive))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        assert!(DEFAULT_DIRECTIVE.parse::<Directive>().is_ok());
    }

    #[test]
    fn test_bad_directive_rejected() {
        let err = init_tracing("grapevine=loudest").expect_err("unknown level");
        assert!(matches!(err, LoggingError::Directive(_)));
    }
}
