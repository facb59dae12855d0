//! Error taxonomy for the conversion pipeline.
//!
//! Decode and missing-field errors are fatal: they mean the export itself is
//! broken and the run stops before anything is written. Fetch errors are
//! recovered per image by the resolver and only ever show up in its report.

use std::path::PathBuf;
use thiserror::Error;

/// A tagged-value envelope that could not be unwrapped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("missing value tag")]
    MissingTag,

    #[error("unsupported value tag: {0}")]
    UnsupportedTag(String),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid double: {0}")]
    InvalidDouble(String),

    #[error("malformed {tag} payload")]
    MalformedPayload { tag: &'static str },
}

/// Failure to fetch a single image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("got status code {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request for {url} failed: {message}")]
    Transport { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("record {record}: field `{field}` could not be decoded: {source}")]
    Decode {
        record: String,
        field: String,
        #[source]
        source: DecodeError,
    },

    #[error("record {record}: required field `{field}` is missing or empty")]
    MissingRequiredField { record: String, field: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image cache entry {id}: {source}")]
    Store {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
