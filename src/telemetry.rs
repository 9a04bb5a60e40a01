//! Tracing subscriber installation for binaries and tests embedding the board.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The fallback filter directive is malformed.
    #[error("invalid log filter directive: {0}")]
    Filter(#[from] ParseError),

    /// Another global subscriber is already installed.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Installs a formatted subscriber as the global default.
///
/// The filter comes from `RUST_LOG` when it is set and valid, otherwise from
/// `default_directive` (for example `"taskboard=info"`).
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the fallback directive is invalid
/// and [`TelemetryError::AlreadyInstalled`] when a subscriber already exists.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::{TelemetryError, init_tracing};

    #[test]
    fn second_installation_is_reported() {
        let first = init_tracing("taskboard=debug");
        assert!(matches!(first, Ok(()) | Err(TelemetryError::AlreadyInstalled)));

        let second = init_tracing("taskboard=debug");
        assert!(matches!(second, Err(TelemetryError::AlreadyInstalled)));
    }
}
