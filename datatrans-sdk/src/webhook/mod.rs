//! Tower middleware that authenticates inbound Datatrans webhooks.
//!
//! [`ValidateWebhookLayer`] sits in front of the webhook handler. It checks
//! the `Datatrans-Signature` header against the raw body and only forwards
//! requests whose HMAC matches. The handler still sees the original body,
//! byte for byte.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use datatrans_sdk::webhook::{ValidateWebhookLayer, WebhookOptions};
//!
//! let layer = ValidateWebhookLayer::new(WebhookOptions::new(sign_key_hex))?;
//! let app = Router::new()
//!     .route("/webhook/datatrans", post(handle_webhook))
//!     .route_layer(layer);
//! ```

mod layer;
pub mod sink;

pub use layer::{ValidateWebhookLayer, ValidateWebhookService};

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Default maximum body size accepted for hashing (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Builds the response sent back when a webhook is rejected.
pub type ErrorResponder = Arc<dyn Fn(WebhookError) -> Response + Send + Sync>;

/// Reasons a webhook is rejected before reaching the handler.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Header absent, not text, or not of the form `t=…,s0=…`.
    #[error("malformed header Datatrans-Signature")]
    MissingSignature,
    /// The body could not be drained for hashing.
    #[error("failed to read webhook body: {0}")]
    BodyRead(String),
    /// The computed HMAC differs from the one in the header.
    #[error("mismatch of Datatrans-Signature")]
    SignatureMismatch,
}

impl WebhookError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "missing_signature",
            WebhookError::BodyRead(_) => "body_read",
            WebhookError::SignatureMismatch => "signature_mismatch",
        }
    }
}

/// Responds with `500 Internal Server Error` and the error text as body.
pub fn default_error_responder(err: WebhookError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

/// Settings for [`ValidateWebhookLayer`].
#[derive(Clone)]
pub struct WebhookOptions {
    /// Hex-encoded HMAC-SHA256 key ("Sign2" key in the Datatrans back office).
    pub sign_key_hex: String,
    /// Called instead of the handler when a webhook is rejected.
    /// Falls back to [`default_error_responder`].
    pub error_responder: Option<ErrorResponder>,
    /// Bodies larger than this are rejected without being forwarded.
    pub body_limit: usize,
}

impl WebhookOptions {
    pub fn new(sign_key_hex: impl Into<String>) -> Self {
        Self {
            sign_key_hex: sign_key_hex.into(),
            error_responder: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Replace the default error responder.
    pub fn error_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(WebhookError) -> Response + Send + Sync + 'static,
    {
        self.error_responder = Some(Arc::new(responder));
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl std::fmt::Debug for WebhookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookOptions")
            .field("error_responder", &self.error_responder.is_some())
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}
