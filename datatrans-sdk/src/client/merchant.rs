//! Merchant credentials and [`Client`] construction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::{Client, ClientError};

/// Credentials and behaviour flags of one Datatrans merchant account.
#[derive(Clone)]
pub struct Merchant {
    /// Your own key for this merchant; `""` is the default merchant.
    pub internal_id: String,
    /// Datatrans merchant id, used as basic auth user.
    pub merchant_id: String,
    /// API password, used as basic auth password.
    pub password: String,
    /// Send requests to the production API instead of the sandbox.
    pub production: bool,
    /// Attach an `Idempotency-Key` to POST requests.
    pub idempotency: bool,
    /// Keep the undecoded JSON on responses that support it.
    pub raw_json_body: bool,
}

impl Merchant {
    pub fn new(merchant_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            internal_id: String::new(),
            merchant_id: merchant_id.into(),
            password: password.into(),
            production: false,
            idempotency: false,
            raw_json_body: true,
        }
    }

    pub fn with_internal_id(mut self, internal_id: impl Into<String>) -> Self {
        self.internal_id = internal_id.into();
        self
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn with_idempotency(mut self, idempotency: bool) -> Self {
        self.idempotency = idempotency;
        self
    }

    pub fn with_raw_json_body(mut self, raw_json_body: bool) -> Self {
        self.raw_json_body = raw_json_body;
        self
    }
}

impl std::fmt::Debug for Merchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merchant")
            .field("internal_id", &self.internal_id)
            .field("merchant_id", &self.merchant_id)
            .field("production", &self.production)
            .field("idempotency", &self.idempotency)
            .field("raw_json_body", &self.raw_json_body)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    merchants: Vec<Merchant>,
    http: Option<reqwest::Client>,
    base_url: Option<Url>,
}

impl ClientBuilder {
    pub fn merchant(mut self, merchant: Merchant) -> Self {
        self.merchants.push(merchant);
        self
    }

    /// Replace the default `reqwest::Client` (30 s timeout, TLS 1.2 or
    /// newer), e.g. to configure a proxy.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Send every request to `base_url` instead of the Datatrans hosts.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn build(self) -> Result<Client, ClientError> {
        let mut merchants = HashMap::with_capacity(self.merchants.len());
        for merchant in self.merchants {
            if merchants.contains_key(&merchant.internal_id) {
                return Err(ClientError::DuplicateMerchant(merchant.internal_id));
            }
            merchants.insert(merchant.internal_id.clone(), merchant);
        }
        if merchants.is_empty() {
            return Err(ClientError::NoMerchants);
        }

        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .min_tls_version(reqwest::tls::Version::TLS_1_2)
                .build()?,
        };

        Ok(Client {
            http,
            merchants: Arc::new(merchants),
            base_url: self.base_url,
            current: String::new(),
        })
    }
}
