//! HTTP client for the Datatrans transaction API.
//!
//! Gated behind the `client` cargo feature so crates that only verify
//! webhooks do not pull in `reqwest`.
//!
//! One [`Client`] can hold the credentials of several merchants. Requests go
//! out for the merchant selected with [`Client::with_merchant`]; without a
//! selection the merchant whose `internal_id` is empty is used.

mod merchant;
mod transactions;

pub use merchant::{ClientBuilder, Merchant};

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::objects::{ApiResponse, ErrorResponse, JsonBody, marshal_json};

/// API root used when a merchant is not flagged for production.
pub const SANDBOX_URL: &str = "https://api.sandbox.datatrans.com";

/// API root for live transactions.
pub const PRODUCTION_URL: &str = "https://api.datatrans.com";

/// Header carrying the idempotency key on POST requests.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Errors produced by [`Client`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Datatrans answered with a non-2xx status and an error body.
    #[error("api error: {0}")]
    Api(ErrorResponse),

    /// Non-2xx status whose body is not a Datatrans error object.
    #[error("undecodable response: status {status}, body: {body}")]
    UndecodableResponse { status: StatusCode, body: String },

    /// Request could not be serialized or response could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// A required request field is empty or zero.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("merchant {0:?} is not configured")]
    UnknownMerchant(String),

    #[error("merchant {0:?} is configured twice")]
    DuplicateMerchant(String),

    #[error("no merchant configured")]
    NoMerchants,
}

/// Typed client for the Datatrans transaction API.
///
/// Cheap to clone; the merchant table and the connection pool are shared.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    merchants: Arc<HashMap<String, Merchant>>,
    base_url: Option<Url>,
    current: String,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Return a clone that sends requests on behalf of `internal_id`.
    ///
    /// An unknown id is reported by the first request, not here.
    pub fn with_merchant(&self, internal_id: impl Into<String>) -> Self {
        Self {
            current: internal_id.into(),
            ..self.clone()
        }
    }

    fn merchant(&self) -> Result<&Merchant, ClientError> {
        self.merchants
            .get(&self.current)
            .ok_or_else(|| ClientError::UnknownMerchant(self.current.clone()))
    }

    fn host(&self, merchant: &Merchant) -> Result<Url, ClientError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }
        let root = if merchant.production {
            PRODUCTION_URL
        } else {
            SANDBOX_URL
        };
        Ok(Url::parse(root)?)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: JsonBody,
        T: ApiResponse,
    {
        let json = marshal_json(body)?;
        self.execute(method, path, Some(json)).await
    }

    async fn execute<T: ApiResponse>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        let merchant = self.merchant()?;
        let host = self.host(merchant)?;
        let url = host.join(path)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .basic_auth(&merchant.merchant_id, Some(&merchant.password));

        if let Some(json) = body {
            if method == Method::POST && merchant.idempotency {
                let key = idempotency_key(&merchant.internal_id, host.as_str(), path, &json);
                request = request.header(IDEMPOTENCY_KEY_HEADER, key);
            }
            request = request.header(CONTENT_TYPE, "application/json").body(json);
        }

        let resp = request.send().await?;
        parse_response(resp, merchant.raw_json_body).await
    }
}

/// Derive a stable key from everything that identifies a POST.
///
/// Datatrans keeps keys for three minutes, so an identical retry inside that
/// window returns the stored result instead of creating a second operation.
fn idempotency_key(internal_id: &str, host: &str, path: &str, json: &[u8]) -> String {
    let mut ctx = ring::digest::Context::new(&ring::digest::SHA256);
    ctx.update(internal_id.as_bytes());
    ctx.update(host.as_bytes());
    ctx.update(path.as_bytes());
    ctx.update(json);
    hex::encode(&ctx.finish().as_ref()[..8])
}

async fn parse_response<T: ApiResponse>(
    resp: reqwest::Response,
    keep_raw_json: bool,
) -> Result<T, ClientError> {
    let status = resp.status();
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(mut err) => {
                err.http_status = status.as_u16();
                Err(ClientError::Api(err))
            }
            Err(_) => Err(ClientError::UndecodableResponse {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        };
    }

    // 204 responses have no body; `()` decodes from `null`.
    let json: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    let mut value: T = serde_json::from_slice(json)?;

    if let Some(location) = location {
        value.set_location(location);
    }
    if keep_raw_json {
        value.set_raw_json(bytes);
    }
    Ok(value)
}
