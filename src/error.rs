//! Error types shared by the fetcher, the resolver and the filter builders.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single typed HTTP GET.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("reading response body from {url} (status {status}) failed: {message}")]
    Body {
        url: String,
        status: u16,
        message: String,
    },

    /// The raw body is kept byte for byte so upstream API drift can be diagnosed.
    #[error(
        "not a valid JSON response from {url} (status {status}): {}",
        String::from_utf8_lossy(.body)
    )]
    Decode {
        url: String,
        status: u16,
        body: Vec<u8>,
    },
}

impl FetchError {
    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { .. } => None,
            FetchError::Body { status, .. } | FetchError::Decode { status, .. } => Some(*status),
        }
    }

    /// Response body exactly as received, for decode failures
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            FetchError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Body { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no business day found within {max_lookback} days before {today}")]
    Exhausted { today: NaiveDate, max_lookback: u32 },

    #[error("midnight of {date} does not exist in time zone {timezone}")]
    NonexistentMidnight { date: NaiveDate, timezone: String },

    #[error("date {date} is at the edge of the supported calendar range")]
    OutOfRange { date: NaiveDate },

    #[error("invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
