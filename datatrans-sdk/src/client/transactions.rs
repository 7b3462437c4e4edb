//! Transaction, alias and reconciliation endpoints.
//!
//! See <https://api-reference.datatrans.ch/> for the semantics of each call.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Client, ClientError};
use crate::objects::{
    ApiResponse, JsonBody, RequestAuthorize, RequestAuthorizeTransaction, RequestCredit,
    RequestCreditAuthorize, RequestInitialize, RequestReconciliationsSale,
    RequestReconciliationsSales, RequestSecureFieldsInit, RequestSecureFieldsUpdate,
    RequestSettle, RequestValidateAlias, ResponseAuthorize, ResponseCardMasked,
    ResponseInitialize, ResponseReconciliationsSale, ResponseReconciliationsSales,
    TransactionStatus,
};

const PATH_TRANSACTIONS: &str = "/v1/transactions";
const PATH_CREDIT_AUTHORIZE: &str = "/v1/transactions/credit";
const PATH_VALIDATE: &str = "/v1/transactions/validate";
const PATH_AUTHORIZE: &str = "/v1/transactions/authorize";
const PATH_SECURE_FIELDS: &str = "/v1/transactions/secureFields";
const PATH_ALIASES: &str = "/v1/aliases";
const PATH_RECONCILIATIONS_SALES: &str = "/v1/reconciliations/sales";
const PATH_RECONCILIATIONS_SALES_BULK: &str = "/v1/reconciliations/sales/bulk";

#[derive(Serialize)]
struct CancelBody<'a> {
    refno: &'a str,
}

impl JsonBody for CancelBody<'_> {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AliasConvertBody<'a> {
    legacy_alias: &'a str,
}

impl JsonBody for AliasConvertBody<'_> {}

#[derive(Deserialize)]
struct AliasConvertResponse {
    alias: String,
}

impl ApiResponse for AliasConvertResponse {}

fn require(ok: bool, what: &'static str) -> Result<(), ClientError> {
    if ok {
        Ok(())
    } else {
        Err(ClientError::InvalidArgument(what))
    }
}

impl Client {
    /// `GET /v1/transactions/{id}` – current state of a transaction.
    pub async fn status(&self, transaction_id: &str) -> Result<TransactionStatus, ClientError> {
        require(!transaction_id.is_empty(), "transaction id cannot be empty")?;
        let path = format!("{PATH_TRANSACTIONS}/{transaction_id}");
        self.execute(Method::GET, &path, None).await
    }

    /// `POST /v1/transactions/{id}/credit` – refund a settled transaction.
    ///
    /// The previously settled amount must not be exceeded.
    pub async fn credit(
        &self,
        transaction_id: &str,
        req: &RequestCredit,
    ) -> Result<ResponseCardMasked, ClientError> {
        require(
            !transaction_id.is_empty() && !req.currency.is_empty() && !req.refno.is_empty(),
            "transaction id, currency and refno are required",
        )?;
        let path = format!("{PATH_TRANSACTIONS}/{transaction_id}/credit");
        self.send_json(Method::POST, &path, req).await
    }

    /// `POST /v1/transactions/credit` – credit a card without a previous debit.
    pub async fn credit_authorize(
        &self,
        req: &RequestCreditAuthorize,
    ) -> Result<ResponseCardMasked, ClientError> {
        require(
            !req.currency.is_empty() && !req.refno.is_empty() && req.amount != 0,
            "currency, refno and amount are required",
        )?;
        self.send_json(Method::POST, PATH_CREDIT_AUTHORIZE, req).await
    }

    /// `POST /v1/transactions/{id}/cancel` – release an authorized amount.
    pub async fn cancel(&self, transaction_id: &str, refno: &str) -> Result<(), ClientError> {
        require(
            !transaction_id.is_empty() && !refno.is_empty(),
            "transaction id and refno are required",
        )?;
        let path = format!("{PATH_TRANSACTIONS}/{transaction_id}/cancel");
        self.send_json(Method::POST, &path, &CancelBody { refno })
            .await
    }

    /// `POST /v1/transactions/{id}/settle` – capture an authorization.
    ///
    /// Not needed for transactions initialized with `auto_settle`.
    pub async fn settle(&self, transaction_id: &str, req: &RequestSettle) -> Result<(), ClientError> {
        require(
            !transaction_id.is_empty()
                && req.amount != 0
                && !req.currency.is_empty()
                && !req.refno.is_empty(),
            "transaction id, amount, currency and refno are required",
        )?;
        let path = format!("{PATH_TRANSACTIONS}/{transaction_id}/settle");
        self.send_json(Method::POST, &path, req).await
    }

    /// `POST /v1/transactions/validate` – check an alias without blocking an amount.
    pub async fn validate_alias(
        &self,
        req: &RequestValidateAlias,
    ) -> Result<ResponseCardMasked, ClientError> {
        require(
            !req.currency.is_empty() && !req.refno.is_empty(),
            "currency and refno are required",
        )?;
        self.send_json(Method::POST, PATH_VALIDATE, req).await
    }

    /// `POST /v1/transactions/{id}/authorize` – authorize a transaction that was
    /// initialized with `authentication_only`.
    pub async fn authorize_transaction(
        &self,
        transaction_id: &str,
        req: &RequestAuthorizeTransaction,
    ) -> Result<ResponseAuthorize, ClientError> {
        require(
            !transaction_id.is_empty() && !req.refno.is_empty(),
            "transaction id and refno are required",
        )?;
        let path = format!("{PATH_TRANSACTIONS}/{transaction_id}/authorize");
        self.send_json(Method::POST, &path, req).await
    }

    /// `POST /v1/transactions/authorize` – authorize without user interaction,
    /// e.g. merchant initiated with an alias.
    pub async fn authorize(&self, req: &RequestAuthorize) -> Result<ResponseCardMasked, ClientError> {
        require(
            req.amount != 0 && !req.currency.is_empty() && !req.refno.is_empty(),
            "amount, currency and refno are required",
        )?;
        self.send_json(Method::POST, PATH_AUTHORIZE, req).await
    }

    /// `POST /v1/transactions` – initialize a payment page transaction.
    ///
    /// Datatrans answers `201 Created`; the payment page URL to redirect the
    /// browser to is returned in [`ResponseInitialize::location`].
    pub async fn initialize(&self, req: &RequestInitialize) -> Result<ResponseInitialize, ClientError> {
        require(
            req.amount != 0 && !req.currency.is_empty() && !req.refno.is_empty(),
            "amount, currency and refno are required",
        )?;
        self.send_json(Method::POST, PATH_TRANSACTIONS, req).await
    }

    /// `POST /v1/transactions/secureFields` – initialize a Secure Fields transaction.
    pub async fn secure_fields_init(
        &self,
        req: &RequestSecureFieldsInit,
    ) -> Result<ResponseInitialize, ClientError> {
        require(
            req.amount != 0 && !req.currency.is_empty() && !req.return_url.is_empty(),
            "amount, currency and return url are required",
        )?;
        self.send_json(Method::POST, PATH_SECURE_FIELDS, req).await
    }

    /// `PATCH /v1/transactions/secureFields/{id}` – change the amount.
    ///
    /// Only allowed before the 3-D Secure step.
    pub async fn secure_fields_update(
        &self,
        transaction_id: &str,
        req: &RequestSecureFieldsUpdate,
    ) -> Result<(), ClientError> {
        require(
            !transaction_id.is_empty() && req.amount != 0 && !req.currency.is_empty(),
            "transaction id, amount and currency are required",
        )?;
        let path = format!("{PATH_SECURE_FIELDS}/{transaction_id}");
        self.send_json(Method::PATCH, &path, req).await
    }

    /// `POST /v1/aliases` – convert a legacy numeric or masked alias to the
    /// current format.
    pub async fn alias_convert(&self, legacy_alias: &str) -> Result<String, ClientError> {
        require(!legacy_alias.is_empty(), "legacy alias cannot be empty")?;
        let resp: AliasConvertResponse = self
            .send_json(Method::POST, PATH_ALIASES, &AliasConvertBody { legacy_alias })
            .await?;
        Ok(resp.alias)
    }

    /// `DELETE /v1/aliases/{alias}` – delete an alias with immediate effect.
    pub async fn alias_delete(&self, alias: &str) -> Result<(), ClientError> {
        require(!alias.is_empty(), "alias cannot be empty")?;
        let path = format!("{PATH_ALIASES}/{alias}");
        self.execute(Method::DELETE, &path, None).await
    }

    /// `POST /v1/reconciliations/sales` – report one sale.
    pub async fn reconciliations_sales(
        &self,
        sale: &RequestReconciliationsSale,
    ) -> Result<ResponseReconciliationsSale, ClientError> {
        require(!sale.transaction_id.is_empty(), "transaction id cannot be empty")?;
        self.send_json(Method::POST, PATH_RECONCILIATIONS_SALES, sale)
            .await
    }

    /// `POST /v1/reconciliations/sales/bulk` – report several sales at once.
    pub async fn reconciliations_sales_bulk(
        &self,
        sales: &RequestReconciliationsSales,
    ) -> Result<ResponseReconciliationsSales, ClientError> {
        require(!sales.sales.is_empty(), "sales cannot be empty")?;
        self.send_json(Method::POST, PATH_RECONCILIATIONS_SALES_BULK, sales)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{IDEMPOTENCY_KEY_HEADER, Merchant};
    use crate::objects::Status;
    use mockito::{Matcher, Server, ServerGuard};
    use url::Url;

    // "1100007006:s3cr3t" and "1100007007:0ther"
    const AUTH_DEFAULT: &str = "Basic MTEwMDAwNzAwNjpzM2NyM3Q=";
    const AUTH_SHOP: &str = "Basic MTEwMDAwNzAwNzowdGhlcg==";

    fn client_for(server: &ServerGuard, default: Merchant) -> Client {
        Client::builder()
            .merchant(default)
            .merchant(Merchant::new("1100007007", "0ther").with_internal_id("shop"))
            .base_url(Url::parse(&server.url()).unwrap())
            .build()
            .unwrap()
    }

    fn default_merchant() -> Merchant {
        Merchant::new("1100007006", "s3cr3t")
    }

    #[tokio::test]
    async fn test_status() {
        let mut server = Server::new_async().await;
        let body = r#"{"transactionId":"210215103042148501","type":"payment","status":"authorized","currency":"CHF","refno":"order-1"}"#;
        let mock = server
            .mock("GET", "/v1/transactions/210215103042148501")
            .match_header("authorization", AUTH_DEFAULT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant());
        let status = client.status("210215103042148501").await.unwrap();

        mock.assert_async().await;
        assert_eq!(status.status, Status::Authorized);
        assert_eq!(status.refno, "order-1");
        assert_eq!(status.raw_json.as_deref(), Some(body.as_bytes()));
    }

    #[tokio::test]
    async fn test_raw_json_can_be_disabled() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/transactions/1")
            .with_status(200)
            .with_body(r#"{"transactionId":"1","status":"settled"}"#)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant().with_raw_json_body(false));
        let status = client.status("1").await.unwrap();

        assert_eq!(status.status, Status::Settled);
        assert!(status.raw_json.is_none());
    }

    #[tokio::test]
    async fn test_initialize_returns_location_and_sends_idempotency_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/transactions")
            .match_header("authorization", AUTH_DEFAULT)
            .match_header("content-type", "application/json")
            .match_header(IDEMPOTENCY_KEY_HEADER, Matcher::Regex("^[0-9a-f]{16}$".to_string()))
            .match_body(Matcher::Json(serde_json::json!({
                "currency": "CHF",
                "refno": "order-7",
                "amount": 1337,
                "language": "de"
            })))
            .with_status(201)
            .with_header("location", "https://pay.sandbox.datatrans.com/v1/start/210215")
            .with_body(r#"{"transactionId":"210215"}"#)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant().with_idempotency(true));
        let mut custom_fields = serde_json::Map::new();
        custom_fields.insert("language".to_string(), serde_json::json!("de"));
        let req = RequestInitialize {
            currency: "CHF".to_string(),
            refno: "order-7".to_string(),
            amount: 1337,
            custom_fields,
            ..Default::default()
        };

        let resp = client.initialize(&req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.transaction_id, "210215");
        assert_eq!(
            resp.location.as_deref(),
            Some("https://pay.sandbox.datatrans.com/v1/start/210215")
        );
    }

    #[tokio::test]
    async fn test_api_error_is_decoded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/transactions/42/credit")
            .with_status(400)
            .with_body(r#"{"error":{"code":"INVALID_PROPERTY","message":"credit.amount"}}"#)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant());
        let req = RequestCredit {
            amount: 100,
            currency: "CHF".to_string(),
            refno: "order-1".to_string(),
            ..Default::default()
        };

        match client.credit("42", &req).await {
            Err(ClientError::Api(err)) => {
                assert_eq!(err.http_status, 400);
                assert_eq!(err.detail.code, "INVALID_PROPERTY");
                assert_eq!(err.detail.message, "credit.amount");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_error_keeps_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/transactions/1")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = client_for(&server, default_merchant());

        match client.status("1").await {
            Err(ClientError::UndecodableResponse { status, body }) => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected undecodable response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_settle_accepts_no_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/transactions/42/settle")
            .match_body(Matcher::Json(serde_json::json!({
                "amount": 1000,
                "currency": "CHF",
                "refno": "order-1"
            })))
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant());
        let req = RequestSettle {
            amount: 1000,
            currency: "CHF".to_string(),
            refno: "order-1".to_string(),
            ..Default::default()
        };

        client.settle("42", &req).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancel_and_alias_calls() {
        let mut server = Server::new_async().await;
        let cancel = server
            .mock("POST", "/v1/transactions/42/cancel")
            .match_body(Matcher::Json(serde_json::json!({"refno": "order-1"})))
            .with_status(204)
            .create_async()
            .await;
        let convert = server
            .mock("POST", "/v1/aliases")
            .match_body(Matcher::Json(serde_json::json!({"legacyAlias": "424242xxxxxx4242"})))
            .with_status(200)
            .with_body(r#"{"alias":"AAABcH0Bq92s3kgAESIAAbGj5NIsAHWC"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/v1/aliases/AAABcH0Bq92s3kgAESIAAbGj5NIsAHWC")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant());

        client.cancel("42", "order-1").await.unwrap();
        let alias = client.alias_convert("424242xxxxxx4242").await.unwrap();
        assert_eq!(alias, "AAABcH0Bq92s3kgAESIAAbGj5NIsAHWC");
        client.alias_delete(&alias).await.unwrap();

        cancel.assert_async().await;
        convert.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_with_merchant_switches_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/transactions/secureFields/42")
            .match_header("authorization", AUTH_SHOP)
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, default_merchant()).with_merchant("shop");
        let req = RequestSecureFieldsUpdate {
            amount: 500,
            currency: "EUR".to_string(),
        };

        client.secure_fields_update("42", &req).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_merchant_fails_at_request_time() {
        let server = Server::new_async().await;
        let client = client_for(&server, default_merchant()).with_merchant("missing");

        assert!(matches!(
            client.status("1").await,
            Err(ClientError::UnknownMerchant(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_required_fields_are_checked_before_sending() {
        let server = Server::new_async().await;
        let client = client_for(&server, default_merchant());

        assert!(matches!(
            client.status("").await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.cancel("42", "").await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.initialize(&RequestInitialize::default()).await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.alias_delete("").await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            client
                .reconciliations_sales_bulk(&RequestReconciliationsSales::default())
                .await,
            Err(ClientError::InvalidArgument(_))
        ));
    }
}
