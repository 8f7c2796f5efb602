//! Error types for Code Insights operations.

use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors that can occur when talking to the Bitbucket Server API.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Bitbucket answered with a non-success status.
    #[error("Bitbucket returned status {status}: {}", describe_rejection(.body.as_ref()))]
    Rejected {
        status: u16,
        body: Option<ErrorResponse>,
    },

    /// A success response arrived without the body the operation needs.
    #[error("No response body from Bitbucket")]
    MissingBody,

    /// Payload could not be encoded, or a response could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection settings are missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl InsightsError {
    /// HTTP status of a rejected request, or the transport-reported status
    /// where one exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn describe_rejection(body: Option<&ErrorResponse>) -> String {
    match body {
        Some(errors) if !errors.errors.is_empty() => errors.to_string(),
        _ => "no error details".to_string(),
    }
}
