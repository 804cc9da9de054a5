//! Response interpretation: status classification, error bodies and
//! `Content-Range` totals.

use lendbook_store::{BackendError, FailureKind};
use reqwest::StatusCode;
use serde::Deserialize;

/// Error body returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Whether a failed status is worth retrying.
///
/// Timeouts, rate limiting and server errors are transient; every other
/// client error is permanent.
pub fn classify_status(status: StatusCode) -> FailureKind {
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        FailureKind::Transient
    } else {
        FailureKind::Permanent
    }
}

/// Build a [`BackendError`] from a failed response.
///
/// Uses the body's `message` when it parses, the raw body text otherwise,
/// and the status line when the body is empty.
pub fn error_from_response(status: StatusCode, body: &str) -> BackendError {
    let kind = classify_status(status);
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    let message = match parsed.as_ref().and_then(|b| b.message.clone()) {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {}", status),
    };

    BackendError {
        message,
        code: parsed.and_then(|b| b.code),
        kind,
    }
}

/// Map a transport failure to a [`BackendError`].
///
/// Connection failures and timeouts are transient. Malformed requests and
/// undecodable bodies are permanent.
pub fn error_from_transport(error: &reqwest::Error) -> BackendError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        BackendError::transient(error.to_string())
    } else {
        BackendError::permanent(error.to_string())
    }
}

/// Total row count from a `Content-Range` header such as `0-9/42` or `*/0`.
///
/// Returns `None` when the total is unknown (`0-9/*`) or the header is
/// malformed.
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::REQUEST_TIMEOUT), FailureKind::Transient);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), FailureKind::Transient);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), FailureKind::Transient);
        assert_eq!(classify_status(StatusCode::SERVICE_UNAVAILABLE), FailureKind::Transient);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), FailureKind::Permanent);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), FailureKind::Permanent);
        assert_eq!(classify_status(StatusCode::CONFLICT), FailureKind::Permanent);
    }

    #[test]
    fn test_error_from_json_body() {
        let body = r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint \"borrowers_email_key\""}"#;
        let error = error_from_response(StatusCode::CONFLICT, body);

        assert_eq!(
            error.message,
            "duplicate key value violates unique constraint \"borrowers_email_key\""
        );
        assert_eq!(error.code.as_deref(), Some("23505"));
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_from_plain_body() {
        let error = error_from_response(StatusCode::BAD_GATEWAY, "upstream unavailable\n");
        assert_eq!(error.message, "upstream unavailable");
        assert!(error.code.is_none());
        assert!(error.is_transient());
    }

    #[test]
    fn test_error_from_empty_body() {
        let error = error_from_response(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(error.message, "HTTP 503 Service Unavailable");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/42"), Some(42));
        assert_eq!(parse_content_range("10-19/25"), Some(25));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }
}
