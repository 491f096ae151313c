//! Error types for the device cleaner
//!
//! Every variant is fatal. Nothing in the crate retries or continues after an
//! error; the binary prints the message and exits with [`FATAL_EXIT_CODE`].

use thiserror::Error;

/// Exit code used for every fatal condition
pub const FATAL_EXIT_CODE: u8 = 2;

/// Maximum number of characters of a response body carried in an error
const BODY_SNIPPET_CHARS: usize = 300;

/// Result type alias for cleaner operations
pub type Result<T> = std::result::Result<T, CleanerError>;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Set MULLVAD_ACCOUNT_NUMBER in your environment.")]
    MissingAccountNumber,

    #[error(
        "Allowlist file '{path}' not found. Create it with one allowed device name per line."
    )]
    AllowlistNotFound { path: String },

    #[error("Allowlist file '{path}' is empty.")]
    AllowlistEmpty { path: String },

    #[error("Failed to read allowlist file '{path}': {source}")]
    AllowlistRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid setting: {message}")]
    InvalidSetting { message: String },

    /// Connection failure, timeout or unreadable body
    #[error("Network/API error: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a status other than the expected one
    #[error("{operation} failed ({status}): {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The API answered successfully but the payload was not what we expect
    #[error("{message}")]
    Contract { message: String },

    #[error("Delete failed for {name} ({status}): {body}")]
    DeleteFailed {
        name: String,
        id: String,
        status: u16,
        body: String,
    },
}

impl CleanerError {
    pub fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        CleanerError::Transport {
            context: context.into(),
            source,
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        CleanerError::Contract {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        FATAL_EXIT_CODE
    }
}

/// Cut a response body down to something that fits on an error line
pub fn snippet(text: &str) -> String {
    text.chars().take(BODY_SNIPPET_CHARS).collect()
}
