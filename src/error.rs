//! Error types and handling for `tempmap`

use thiserror::Error;

/// Main error type for the `tempmap` application
#[derive(Error, Debug)]
pub enum TempMapError {
    /// Configuration-related errors, including a malformed city registry
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TempMapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TempMapError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file.")
            }
            TempMapError::Api { .. } => {
                "Unable to connect to the weather service. Please check your internet connection."
                    .to_string()
            }
            TempMapError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TempMapError::General { message } => message.clone(),
        }
    }
}

/// Reason a single city could not be fetched.
///
/// None of these abort a fetch cycle; the city is reported and skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection or timeout failure talking to the provider
    #[error("network error{}: {message}", timeout_suffix(.timed_out))]
    Network { message: String, timed_out: bool },

    /// Provider answered with a non-success status code
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Body did not contain the expected field(s)
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn timeout_suffix(timed_out: &bool) -> &'static str {
    if *timed_out { " (timed out)" } else { "" }
}

impl FetchError {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
            }
        } else if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::malformed(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}
