//! Error body returned by the Datatrans API on non-2xx responses.
//!
//! See <https://docs.datatrans.ch/docs/error-messages>.

use serde::{Deserialize, Serialize};

/// Decoded `{"error": {...}}` body together with the HTTP status it came with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub http_status: u16,
    #[serde(rename = "error")]
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HTTP status {} code {:?}: {:?}",
            self.http_status, self.detail.code, self.detail.message
        )
    }
}

impl std::error::Error for ErrorResponse {}
