//! Platform wire formats that never leave this crate: list envelopes, error
//! bodies and paging headers.

use domain::{ApiError, ContinuationToken};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

/// Header carrying the cursor for the next page of a listing.
pub(crate) const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

/// Longest raw body echoed into an error message.
const MAX_BODY_IN_ERROR: usize = 512;

/// `{"count": n, "value": [...]}` wrapper used by every list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default)]
    #[allow(dead_code)] // Mirrors the wire format; `value.len()` is authoritative.
    pub count: usize,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Error body returned by the platform's services.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VssErrorBody {
    message: String,
    #[serde(default)]
    type_key: Option<String>,
}

pub(crate) fn continuation_token(headers: &HeaderMap) -> Option<ContinuationToken> {
    headers
        .get(CONTINUATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| ContinuationToken::new(value.trim()))
}

/// Builds the pass-through error for a non-success response.
///
/// Uses the service's own message and type key when the body is a platform
/// error document, the raw body when it is not, and the status reason when
/// there is no body at all.
pub(crate) fn error_from_response(status: StatusCode, body: &[u8]) -> ApiError {
    if let Ok(parsed) = serde_json::from_slice::<VssErrorBody>(body) {
        let error = ApiError::http(status.as_u16(), parsed.message);
        return match parsed.type_key {
            Some(key) if !key.is_empty() => error.with_type_key(key),
            _ => error,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        truncate(text, MAX_BODY_IN_ERROR)
    };
    ApiError::http(status.as_u16(), message)
}

/// The service answers requests with a rejected token by redirecting to its
/// sign-in page, which arrives as `203 Non-Authoritative Information` with an
/// HTML body instead of a 401.
pub(crate) fn sign_in_page_error(status: StatusCode) -> ApiError {
    ApiError::http(
        status.as_u16(),
        "received the sign-in page instead of JSON; check the personal access token and its scopes",
    )
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
