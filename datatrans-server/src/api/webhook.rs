use axum::http::StatusCode;
use bytes::Bytes;
use datatrans_sdk::objects::TransactionStatus;

use super::WebhookApiError;

/// `POST {webhook.path}` — record a verified transaction status push.
///
/// Only reached once the signature layer has accepted the body, so the
/// payload can be trusted.
pub(super) async fn receive_webhook(body: Bytes) -> Result<StatusCode, WebhookApiError> {
    let status: TransactionStatus =
        serde_json::from_slice(&body).map_err(WebhookApiError::InvalidPayload)?;

    tracing::info!(
        transaction_id = %status.transaction_id,
        status = %status.status,
        refno = %status.refno,
        "Datatrans webhook received"
    );

    Ok(StatusCode::OK)
}
