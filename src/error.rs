//! Error handling and custom error types
//!
//! Every failure in the request pipeline is one of these variants. None of
//! them is fatal: the caller reports the message and is free to start the
//! next action.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Input media could not be read or encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Missing credential, or one the service rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The service answered with a structured `error.message` payload.
    #[error("{message}")]
    Remote { message: String },

    /// The service answered, but not with any usable text.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Expected sentinel or fence not found. Extractors log this and fall
    /// back to a placeholder instead of returning it.
    #[error("Content shape mismatch: {0}")]
    ContentShapeMismatch(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message suitable for showing to a person.
    pub fn user_message(&self) -> String {
        match self {
            Error::Remote { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
