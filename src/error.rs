use thiserror::Error;

use crate::types::ContentCategory;

/// Errors surfaced by the SDK. Network outcomes are always returned as values.
#[derive(Debug, Error)]
pub enum KlipyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("{0} returned an empty body")]
    EmptyBody(String),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no endpoint family for category {0:?}")]
    UnroutableCategory(ContentCategory),
}

/// Failure to turn one raw payload into its typed shape or domain item.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{shape} item is missing required field `{field}`")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub(crate) fn missing(shape: &'static str, field: &'static str) -> Self {
        DecodeError::MissingField { shape, field }
    }
}

pub type Result<T, E = KlipyError> = std::result::Result<T, E>;
