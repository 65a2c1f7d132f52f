//! Decoding of the outer response envelope.
//!
//! The Web API answers with a JSON object:
//!
//! ```json
//! {"result": 0, "licenseKey": "<base64>", "signature": "<base64>"}
//! {"result": 1, "message": "Could not find the key."}
//! ```

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{reason, Error, LicenseResult, ServerError};

/// The encoded payload and signature of a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub license_key: String,
    pub signature: String,
}

/// Known server messages, matched case-insensitively with the trailing period dropped.
const SERVER_MESSAGES: &[(&str, ServerError)] = &[
    ("unable to authenticate", ServerError::InvalidAccessToken),
    ("invalid access token", ServerError::InvalidAccessToken),
    ("access denied", ServerError::AccessDenied),
    ("the input parameters were incorrect", ServerError::IncorrectInputParameter),
    ("could not find the product", ServerError::ProductNotFound),
    ("product not found", ServerError::ProductNotFound),
    ("could not find the key", ServerError::KeyNotFound),
    ("key not found", ServerError::KeyNotFound),
    ("the key is blocked", ServerError::KeyBlocked),
    ("key is blocked", ServerError::KeyBlocked),
    (
        "cannot activate the new device as the limit has been reached",
        ServerError::DeviceLimitReached,
    ),
];

/// Maps a server error message to its [`ServerError`].
///
/// Unrecognised messages give [`ServerError::UnknownServerError`].
#[must_use]
pub fn parse_server_error_message(message: &str) -> ServerError {
    let normalized = message.trim().trim_end_matches('.').to_lowercase();
    SERVER_MESSAGES
        .iter()
        .find(|(phrase, _)| normalized == *phrase || normalized.contains(phrase))
        .map_or(ServerError::UnknownServerError, |(_, err)| *err)
}

/// Decodes an Activate response body.
pub fn decode(response: &str) -> LicenseResult<Envelope> {
    let doc: Map<String, Value> = serde_json::from_str(response).map_err(|e| {
        warn!("response is not a JSON object: {e}");
        Error::json(reason::json::PARSE)
    })?;

    if doc.get("result").and_then(Value::as_i64) != Some(0) {
        let Some(message) = doc.get("message").and_then(Value::as_str) else {
            warn!("failure reply without a message");
            return Err(Error::main(reason::main::UNKNOWN_SERVER_REPLY));
        };
        let err = parse_server_error_message(message);
        warn!(reason = ?err, "server rejected activation: {message}");
        return Err(Error::main(err.code()));
    }

    Ok(Envelope {
        license_key: required_str(&doc, "licenseKey")?,
        signature: required_str(&doc, "signature")?,
    })
}

fn required_str(doc: &Map<String, Value>, name: &str) -> LicenseResult<String> {
    doc.get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            warn!("success reply is missing `{name}`");
            Error::main(reason::main::UNKNOWN_SERVER_REPLY)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_table_ignores_case_and_period() {
        assert_eq!(parse_server_error_message("Access denied."), ServerError::AccessDenied);
        assert_eq!(parse_server_error_message("ACCESS DENIED"), ServerError::AccessDenied);
        assert_eq!(parse_server_error_message("  Key not found.  "), ServerError::KeyNotFound);
    }

    #[test]
    fn message_table_matches_substrings() {
        assert_eq!(
            parse_server_error_message("The key is blocked and cannot be accessed."),
            ServerError::KeyBlocked
        );
    }

    #[test]
    fn unknown_message() {
        assert_eq!(parse_server_error_message("Something odd."), ServerError::UnknownServerError);
        assert_eq!(parse_server_error_message(""), ServerError::UnknownServerError);
    }

    #[test]
    fn result_must_be_an_integer_zero() {
        let err = decode(r#"{"result":"0","licenseKey":"a","signature":"b"}"#).unwrap_err();
        assert_eq!(err.main_reason(), Some(ServerError::UnknownServerReply));
    }
}
