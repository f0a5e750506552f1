//! Unified error handling for the app.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Engine(#[from] calcvault_engine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid command: {0}")]
    Command(String),
}

/// Result type alias for the app.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_display_plainly() {
        let err: AppError = calcvault_engine::Error::IncorrectPassword.into();
        assert_eq!(err.to_string(), "Incorrect password. Access denied.");
    }

    #[test]
    fn command_errors() {
        let err = AppError::Command("unknown key: x".into());
        assert_eq!(err.to_string(), "Invalid command: unknown key: x");
    }
}
