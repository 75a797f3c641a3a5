//! HTTP payload helpers shared by the API client.

use crate::models::ErrorBody;

/// Extract the human-readable message from a backend error payload.
///
/// Returns `None` for empty bodies, non-JSON bodies and payloads without a
/// usable `message`/`error` field.
pub fn error_message_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}
