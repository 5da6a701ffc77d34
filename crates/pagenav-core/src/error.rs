//! Navigation error types with rich context

use thiserror::Error;

use crate::types::{Idiom, Orientation};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Navigation error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid page type: {message}")]
    InvalidPageType { message: String },

    #[error("Invalid view model type: {message}")]
    InvalidViewModelType { message: String },

    // ─────────────────────────────────────────────────────────────
    // Resolution / Construction Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Could not find suitable page for url:'{url}', idiom:'{idiom}', and orientation:'{orientation}'")]
    PageNotFound {
        url: String,
        idiom: Idiom,
        orientation: Orientation,
    },

    #[error("Failed to create instance of '{variant}': {reason}")]
    Instantiation { variant: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Stack Protocol Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    // ─────────────────────────────────────────────────────────────
    // Display Adapter Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Display error: {message}")]
    Display { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Navigator task stopped unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_page_type(message: impl Into<String>) -> Self {
        Self::InvalidPageType {
            message: message.into(),
        }
    }

    pub fn invalid_view_model_type(message: impl Into<String>) -> Self {
        Self::InvalidViewModelType {
            message: message.into(),
        }
    }

    pub fn page_not_found(url: impl Into<String>, idiom: Idiom, orientation: Orientation) -> Self {
        Self::PageNotFound {
            url: url.into(),
            idiom,
            orientation,
        }
    }

    pub fn instantiation(variant: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            variant: variant.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn display(message: impl Into<String>) -> Self {
        Self::Display {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors are raised before any navigation state was touched,
    /// so the caller can correct the request and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. }
                | Error::InvalidPageType { .. }
                | Error::InvalidViewModelType { .. }
                | Error::PageNotFound { .. }
                | Error::Instantiation { .. }
                | Error::InvalidOperation { .. }
        )
    }

    /// Check if this error leaves the navigator unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ChannelClosed | Error::Display { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::invalid_argument("'url' cannot be empty or whitespace.");
        assert_eq!(
            err.to_string(),
            "Invalid argument: 'url' cannot be empty or whitespace."
        );

        let err = Error::page_not_found("Settings", Idiom::Tablet, Orientation::Landscape);
        assert_eq!(
            err.to_string(),
            "Could not find suitable page for url:'Settings', idiom:'Tablet', and orientation:'Landscape'"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("not valid toml {{{{").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_validation_errors_are_recoverable() {
        assert!(Error::invalid_argument("x").is_recoverable());
        assert!(Error::invalid_page_type("x").is_recoverable());
        assert!(Error::invalid_view_model_type("x").is_recoverable());
        assert!(Error::invalid_operation("x").is_recoverable());
        assert!(Error::instantiation("Page3", "no constructor").is_recoverable());
        assert!(!Error::ChannelClosed.is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::ChannelClosed.is_fatal());
        assert!(Error::display("renderer gone").is_fatal());
        assert!(!Error::invalid_operation("root").is_fatal());
    }

    #[test]
    fn test_instantiation_error_names_variant() {
        let err = Error::instantiation("DetailViewModel", "missing service");
        let text = err.to_string();
        assert!(text.contains("DetailViewModel"));
        assert!(text.contains("missing service"));
    }

    #[test]
    fn test_context_preserves_error_kind() {
        let result: std::result::Result<(), Error> = Err(Error::invalid_operation("root"));
        let err = result.context("popping").unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
    }
}
