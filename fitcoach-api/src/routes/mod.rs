/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: OAuth callback
/// - `user`: Role lookup and onboarding
/// - `conversations`: Chat history
/// - `chat`: Sending messages to the coach
/// - `programs`: Training programs and purchases
/// - `admin`: Admin status and user listing
/// - `maintenance`: Maintenance status
///
/// Successful responses share the envelope `{"success": true, ..., "error": null}`.

use axum::Json;
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod chat;
pub mod conversations;
pub mod health;
pub mod maintenance;
pub mod programs;
pub mod user;

/// Success envelope around a handler's payload
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(flatten)]
    pub data: T,

    pub error: Option<String>,
}

/// Wraps `data` in a success envelope
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        role: &'static str,
    }

    #[test]
    fn test_success_envelope_flattens_payload() {
        let Json(envelope) = success(Payload { role: "admin" });

        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({"success": true, "role": "admin", "error": null})
        );
    }
}
