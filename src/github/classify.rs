//! Response classification
//!
//! Maps a drained HTTP response onto the [`HostingError`] taxonomy.
//! Every API call goes through [`classify_response`] exactly once.

use super::transport::{RawResponse, TransportError};
use super::{HostingError, HostingResult};
use serde_json::Value;

const DEFAULT_PERMISSION_MESSAGE: &str = "access to the resource is forbidden";

/// Successful API payload
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body parsed as structured JSON
    Json(Value),
    /// Success with no structured body (e.g. 204 No Content)
    Empty,
}

impl ApiResponse {
    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Empty => None,
        }
    }
}

/// Classify a drained response into success or a taxonomy failure
pub fn classify_response(resp: RawResponse) -> HostingResult<ApiResponse> {
    match resp.status {
        401 => Err(HostingError::Authentication(
            "token is invalid or expired".to_string(),
        )),
        404 => Err(HostingError::NotFound(
            "repository does not exist or is not accessible".to_string(),
        )),
        403 => Err(classify_forbidden(&resp)),
        200..=299 => parse_success(resp),
        status => Err(HostingError::network(
            Some(status),
            format!("unexpected HTTP status {}", status),
        )),
    }
}

/// Classify a failure that happened before any status was received
pub fn classify_transport(err: TransportError) -> HostingError {
    match err {
        TransportError::Timeout => HostingError::network(None, "request timed out"),
        TransportError::Request(detail) => HostingError::network(None, detail),
    }
}

/// 403 carries several distinct meanings on GitHub; the rate-limit checks run
/// first because throttling responses also mention forbidden access.
fn classify_forbidden(resp: &RawResponse) -> HostingError {
    if resp.rate_limit_remaining.as_deref().map(str::trim) == Some("0") {
        return HostingError::RateLimited("remaining request quota is 0".to_string());
    }

    let Some(body) = resp.body.as_deref() else {
        tracing::debug!("403 response body unreadable; treating as permission failure");
        return HostingError::Permission(DEFAULT_PERMISSION_MESSAGE.to_string());
    };

    let lower = body.to_lowercase();

    if lower.contains("rate limit") {
        return HostingError::RateLimited("API rate limit exceeded".to_string());
    }

    if lower.contains("bad credentials") || lower.contains("invalid token") {
        return HostingError::Authentication("token is invalid or expired".to_string());
    }

    if lower.contains("insufficient") || lower.contains("scope") {
        return HostingError::Permission(
            "token lacks a required scope (e.g. public_repo)".to_string(),
        );
    }

    if lower.contains("forbidden") || lower.contains("access denied") {
        return HostingError::Permission(
            "access forbidden; check repository visibility or token permissions".to_string(),
        );
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(message) = map.get("message") {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return HostingError::Permission(message);
        }
    }

    HostingError::Permission(DEFAULT_PERMISSION_MESSAGE.to_string())
}

fn parse_success(resp: RawResponse) -> HostingResult<ApiResponse> {
    let Some(body) = resp.body else {
        return Err(HostingError::network(
            Some(resp.status),
            "failed to read response body",
        ));
    };

    let is_json = resp
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    if !is_json || body.trim().is_empty() {
        return Ok(ApiResponse::Empty);
    }

    serde_json::from_str(&body)
        .map(ApiResponse::Json)
        .map_err(|e| HostingError::network(Some(resp.status), format!("malformed JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ErrorKind;

    fn kind_of(resp: RawResponse) -> ErrorKind {
        classify_response(resp)
            .expect_err("response should be classified as a failure")
            .kind()
    }

    #[test]
    fn test_status_table() {
        let cases: Vec<(RawResponse, ErrorKind)> = vec![
            (RawResponse::new(401, ""), ErrorKind::AuthenticationFailure),
            (RawResponse::new(404, "{}"), ErrorKind::NotFound),
            (
                RawResponse::new(403, "").with_rate_limit_remaining("0"),
                ErrorKind::RateLimitFailure,
            ),
            (
                RawResponse::new(403, r#"{"message":"API rate limit exceeded for 1.2.3.4"}"#),
                ErrorKind::RateLimitFailure,
            ),
            (
                RawResponse::new(403, r#"{"message":"Bad credentials"}"#),
                ErrorKind::AuthenticationFailure,
            ),
            (
                RawResponse::new(403, "Invalid token supplied"),
                ErrorKind::AuthenticationFailure,
            ),
            (
                RawResponse::new(403, "Resource not accessible: insufficient scopes"),
                ErrorKind::PermissionFailure,
            ),
            (
                RawResponse::new(403, "Forbidden"),
                ErrorKind::PermissionFailure,
            ),
            (
                RawResponse::new(403, "ACCESS DENIED by policy"),
                ErrorKind::PermissionFailure,
            ),
            (
                RawResponse::new(403, r#"{"message":"Repository is archived"}"#),
                ErrorKind::PermissionFailure,
            ),
            (RawResponse::new(403, ""), ErrorKind::PermissionFailure),
            (
                RawResponse::new(403, "whatever").without_body(),
                ErrorKind::PermissionFailure,
            ),
            (RawResponse::new(500, ""), ErrorKind::NetworkFailure),
            (RawResponse::new(302, ""), ErrorKind::NetworkFailure),
            (RawResponse::new(422, "{}"), ErrorKind::NetworkFailure),
        ];

        for (resp, expected) in cases {
            let desc = format!("{:?}", resp);
            assert_eq!(kind_of(resp), expected, "case: {}", desc);
        }
    }

    #[test]
    fn test_rate_limit_phrase_beats_forbidden_wording() {
        let resp = RawResponse::new(
            403,
            "Forbidden: access denied, you have exceeded a secondary rate limit",
        );
        assert_eq!(kind_of(resp), ErrorKind::RateLimitFailure);
    }

    #[test]
    fn test_rate_limit_header_nonzero_falls_through_to_body() {
        let resp = RawResponse::new(403, "Bad credentials").with_rate_limit_remaining("42");
        assert_eq!(kind_of(resp), ErrorKind::AuthenticationFailure);
    }

    #[test]
    fn test_structured_message_is_kept() {
        let err = classify_response(RawResponse::new(
            403,
            r#"{"message":"Repository is archived"}"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            HostingError::Permission("Repository is archived".to_string())
        );
    }

    #[test]
    fn test_network_failure_carries_status() {
        let err = classify_response(RawResponse::new(503, "")).unwrap_err();
        match err {
            HostingError::Network { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_success_json_and_empty() {
        let ok = classify_response(RawResponse::new(200, r#"{"login":"octocat"}"#).with_json())
            .unwrap();
        assert_eq!(ok, ApiResponse::Json(serde_json::json!({"login": "octocat"})));

        let no_content = classify_response(RawResponse::new(204, "")).unwrap();
        assert_eq!(no_content, ApiResponse::Empty);

        let plain = classify_response(RawResponse::new(200, "ok")).unwrap();
        assert_eq!(plain, ApiResponse::Empty);
    }

    #[test]
    fn test_success_with_malformed_json_is_network_failure() {
        let err = classify_response(RawResponse::new(200, "{not json").with_json()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    }

    #[test]
    fn test_transport_errors() {
        assert_eq!(
            classify_transport(TransportError::Timeout).kind(),
            ErrorKind::NetworkFailure
        );
        assert_eq!(
            classify_transport(TransportError::Request("dns".into())).kind(),
            ErrorKind::NetworkFailure
        );
    }
}
