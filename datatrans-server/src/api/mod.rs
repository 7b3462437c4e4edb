//! Webhook API.
//!
//! # Endpoints
//!
//! - `POST {webhook.path}` – signed transaction status push from Datatrans

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use datatrans_sdk::signature::SignatureError;
use datatrans_sdk::webhook::{ValidateWebhookLayer, WebhookError, WebhookOptions};

use crate::config::file::WebhookConfig;

mod webhook;

/// Build the webhook router with signature verification in front of the
/// handler.
pub fn router(config: &WebhookConfig) -> Result<Router, SignatureError> {
    let options = WebhookOptions::new(config.sign_key.as_str())
        .body_limit(config.body_limit)
        .error_responder(webhook_error_responder);
    let layer = ValidateWebhookLayer::new(options)?;

    Ok(Router::new()
        .route(&config.path, post(webhook::receive_webhook))
        .route_layer(layer))
}

/// Map a rejected delivery to a client error instead of the default 500.
fn webhook_error_responder(err: WebhookError) -> Response {
    let status = match err {
        WebhookError::MissingSignature | WebhookError::SignatureMismatch => {
            StatusCode::UNAUTHORIZED
        }
        WebhookError::BodyRead(_) => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string()).into_response()
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur after the signature has been accepted.
#[derive(Debug)]
enum WebhookApiError {
    /// The body is not a transaction status object.
    InvalidPayload(serde_json::Error),
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self {
            WebhookApiError::InvalidPayload(e) => {
                tracing::warn!(error = %e, "Signed webhook has an invalid payload");
                (StatusCode::BAD_REQUEST, "invalid webhook payload").into_response()
            }
        }
    }
}
