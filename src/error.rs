//! Error types for the Agromate dashboard.

use thiserror::Error;

/// The main error type for Agromate.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal/TUI related errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A backend request failed at the transport level or returned a
    /// non-success status. The message is meant to be shown as-is.
    #[error("{0}")]
    FetchFailed(String),

    /// The backend answered with a body that does not match the expected shape.
    #[error("Respuesta inválida del backend: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Create a new terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Build the user-facing "fetch failed" error for a resource.
    ///
    /// `resource` is the Spanish noun phrase of what was being loaded
    /// (e.g. "las noticias"); `base_url` is the backend the client talks to.
    pub fn fetch_failed(resource: &str, base_url: &str) -> Self {
        Self::FetchFailed(format!(
            "No se pudieron obtener {resource}. Verificá que el backend esté corriendo en {base_url}."
        ))
    }

    /// Build the user-facing error for a failed pipeline trigger.
    pub fn trigger_failed(base_url: &str) -> Self {
        Self::FetchFailed(format!(
            "No se pudo iniciar el análisis. Verificá que el backend esté corriendo en {base_url}."
        ))
    }

    /// Create a new decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed(_) | Self::Decode(_) | Self::Channel(_) | Self::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_names_resource_and_backend() {
        let err = Error::fetch_failed("las noticias", "http://localhost:8000");
        let msg = err.to_string();
        assert!(msg.contains("las noticias"));
        assert!(msg.contains("http://localhost:8000"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_terminal_errors_are_not_recoverable() {
        assert!(!Error::terminal("raw mode").is_recoverable());
        assert!(!Error::config("bad toml").is_recoverable());
    }
}
