//! [`ValidateWebhookLayer`] and the service it produces.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{body::Body, extract::Request, response::Response};
use bytes::BytesMut;
use futures_util::{StreamExt, future::BoxFuture};
use tower::{Layer, Service};
use tracing::{debug, warn};

use super::sink::{ByteSink, FanOut};
use super::{ErrorResponder, WebhookError, WebhookOptions, default_error_responder};
use crate::signature::{SIGNATURE_HEADER, SignatureError, WebhookKey, parse_signature_header};

/// Immutable state shared by every request passing through the layer.
struct Shared {
    key: WebhookKey,
    error_responder: ErrorResponder,
    body_limit: usize,
}

/// Tower layer that rejects webhooks whose `Datatrans-Signature` does not
/// match the body.
#[derive(Clone)]
pub struct ValidateWebhookLayer {
    shared: Arc<Shared>,
}

impl ValidateWebhookLayer {
    /// Build the layer, decoding the hex key up front.
    ///
    /// Fails if `sign_key_hex` is not valid hex, so a misconfigured layer can
    /// never be installed.
    pub fn new(options: WebhookOptions) -> Result<Self, SignatureError> {
        let key = WebhookKey::from_hex(&options.sign_key_hex)?;
        let error_responder = options
            .error_responder
            .unwrap_or_else(|| Arc::new(default_error_responder));

        Ok(Self {
            shared: Arc::new(Shared {
                key,
                error_responder,
                body_limit: options.body_limit,
            }),
        })
    }
}

impl<S> Layer<S> for ValidateWebhookLayer {
    type Service = ValidateWebhookService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidateWebhookService {
            inner,
            shared: self.shared.clone(),
        }
    }
}

/// Service produced by [`ValidateWebhookLayer`].
#[derive(Clone)]
pub struct ValidateWebhookService<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S> Service<Request> for ValidateWebhookService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // `self.inner` is the instance polled ready; keep the fresh clone for
        // the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let shared = self.shared.clone();

        Box::pin(async move {
            match authenticate(&shared, req).await {
                Ok(req) => {
                    debug!("Webhook signature verified");
                    inner.call(req).await
                }
                Err(err) => {
                    warn!(error.kind = err.kind(), error = %err, "Webhook rejected");
                    Ok((shared.error_responder)(err))
                }
            }
        })
    }
}

/// Check the signature of `req` and hand it back with a replayable body.
async fn authenticate(shared: &Shared, req: Request) -> Result<Request, WebhookError> {
    let (parts, body) = req.into_parts();

    let (accumulator, claimed) = {
        let header = parts
            .headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(parse_signature_header)
            .unwrap_or_default();
        if !header.is_complete() {
            return Err(WebhookError::MissingSignature);
        }
        (shared.key.accumulator(header.timestamp), header.hash)
    };

    let mut sink = FanOut(BytesMut::new(), accumulator);
    drain_body(body, &mut sink, shared.body_limit).await?;
    let FanOut(buffer, accumulator) = sink;

    // The original body is gone at this point; the handler reads the copy.
    let req = Request::from_parts(parts, Body::from(buffer.freeze()));

    if !accumulator.verify(&claimed) {
        return Err(WebhookError::SignatureMismatch);
    }
    Ok(req)
}

/// Stream `body` into `sink`, consuming it.
async fn drain_body<K: ByteSink>(
    body: Body,
    sink: &mut K,
    limit: usize,
) -> Result<(), WebhookError> {
    let mut stream = body.into_data_stream();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| WebhookError::BodyRead(e.to_string()))?;
        total += chunk.len();
        if total > limit {
            return Err(WebhookError::BodyRead(format!(
                "body exceeds limit of {limit} bytes"
            )));
        }
        sink.write(&chunk);
    }
    Ok(())
}
