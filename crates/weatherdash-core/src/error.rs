//! Centralized error types for weatherdash.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for API responses
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Startup and server lifecycle failures end up here.
/// Use `user_message()` to get a client-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display to API clients.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file or socket operation failed. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the weather service. Check your internet connection."
            }
            NetworkError::Timeout => "The weather service timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { status: 401 | 403, .. } => {
                "The weather service rejected the API key. Check settings."
            }
            NetworkError::ServerError { .. } => {
                "The weather service rejected the request. Check the location and try again."
            }
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response from the weather service."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let messages = [
            NetworkError::Timeout.user_message(),
            NetworkError::ConnectionFailed("refused".into()).user_message(),
            NetworkError::InvalidResponse("eof".into()).user_message(),
            ConfigError::Invalid("test".into()).user_message(),
            AppError::Io(std::io::Error::other("addr in use")).user_message(),
        ];

        for message in messages {
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_server_error_messages_by_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        assert!(server.user_message().contains("experiencing issues"));

        let auth = NetworkError::ServerError {
            status: 401,
            message: "bad key".into(),
        };
        assert!(auth.user_message().contains("API key"));

        let client = NetworkError::ServerError {
            status: 400,
            message: "no matching location".into(),
        };
        assert!(client.user_message().contains("location"));
    }

    #[test]
    fn test_app_error_conversion() {
        let config_err = ConfigError::Invalid("server.port: Port cannot be 0".into());
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Network(NetworkError::Timeout);
        assert_eq!(
            app_err.user_message(),
            "The weather service timed out. Please try again."
        );
    }
}
