//! JSON encoding of request payloads and decoding of response bodies.
//!
//! Null suppression and unknown-field tolerance are carried by the model
//! types' serde attributes, so the codec itself holds no state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::InsightsError;
use crate::models::ErrorResponse;

/// Serialize a request payload.
///
/// # Errors
/// Returns [`InsightsError::Serialization`] if the payload cannot be encoded.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, InsightsError> {
    Ok(serde_json::to_string(payload)?)
}

/// Deserialize a success response body.
///
/// # Errors
/// Returns [`InsightsError::MissingBody`] for an empty body and
/// [`InsightsError::Serialization`] if the body does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, InsightsError> {
    if body.trim().is_empty() {
        return Err(InsightsError::MissingBody);
    }

    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, body = %body, "Failed to parse response");
        InsightsError::Serialization(e)
    })
}

/// Best-effort parse of an error document; `None` when absent or malformed.
#[must_use]
pub fn decode_error_body(body: &str) -> Option<ErrorResponse> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(body) {
        Ok(errors) => Some(errors),
        Err(e) => {
            debug!(error = %e, "Error response body is not a Bitbucket error document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerProperties;

    #[test]
    fn test_decode_empty_body_is_missing() {
        let result: Result<ServerProperties, _> = decode("  ");
        assert!(matches!(result, Err(InsightsError::MissingBody)));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let result: Result<ServerProperties, _> = decode(r#"{"name":"x"}"#);
        assert!(matches!(result, Err(InsightsError::Serialization(_))));
    }

    #[test]
    fn test_error_body_best_effort() {
        assert!(decode_error_body("").is_none());
        assert!(decode_error_body("<html>Bad Gateway</html>").is_none());

        let parsed = decode_error_body(r#"{"errors":[{"message":"nope"}]}"#).unwrap();
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].message, "nope");
    }
}
