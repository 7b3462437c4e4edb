//! Transaction API payloads.
//!
//! Amounts are in the currency's minor unit (e.g. Rappen for CHF).
//! Field names follow the JSON wire format documented at
//! <https://api-reference.datatrans.ch/>.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::{ApiResponse, JsonBody, PaymentMethod, Status};

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// A tokenized card, referenced by its alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAlias {
    pub alias: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMaskedSimple {
    pub masked: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /v1/transactions` — start a payment page / lightbox transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInitialize {
    pub currency: String,
    pub refno: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_settle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<InitializeOption>,
    #[serde(skip)]
    pub custom_fields: Map<String, Value>,
}

impl JsonBody for RequestInitialize {
    fn custom_fields(&self) -> Option<&Map<String, Value>> {
        Some(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_url: Option<String>,
}

/// Overrides the webhook URL configured in the back office.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOption {
    #[serde(default, skip_serializing_if = "is_false")]
    pub create_alias: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub authentication_only: bool,
}

/// `POST /v1/transactions/authorize` — merchant-initiated authorization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAuthorize {
    pub currency: String,
    pub refno: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardAlias>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_settle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
    #[serde(skip)]
    pub custom_fields: Map<String, Value>,
}

impl JsonBody for RequestAuthorize {
    fn custom_fields(&self) -> Option<&Map<String, Value>> {
        Some(&self.custom_fields)
    }
}

/// `POST /v1/transactions/{id}/authorize` — authorize an authenticated transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAuthorizeTransaction {
    pub refno: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_settle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
}

impl JsonBody for RequestAuthorizeTransaction {}

/// `POST /v1/transactions/validate` — check an alias without reserving money.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestValidateAlias {
    pub currency: String,
    pub refno: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardAlias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
}

impl JsonBody for RequestValidateAlias {}

/// `POST /v1/transactions/{id}/settle` — capture an authorization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSettle {
    pub amount: i64,
    pub currency: String,
    pub refno: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl JsonBody for RequestSettle {}

/// `POST /v1/transactions/{id}/credit` — refund a settled transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCredit {
    pub amount: i64,
    pub currency: String,
    pub refno: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl JsonBody for RequestCredit {}

/// `POST /v1/transactions/credit` — credit without a previous debit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCreditAuthorize {
    pub currency: String,
    pub refno: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardAlias>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_settle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refno2: Option<String>,
}

impl JsonBody for RequestCreditAuthorize {}

/// `POST /v1/transactions/secureFields` — start a Secure Fields transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSecureFieldsInit {
    pub amount: i64,
    pub currency: String,
    pub return_url: String,
    #[serde(skip)]
    pub custom_fields: Map<String, Value>,
}

impl JsonBody for RequestSecureFieldsInit {
    fn custom_fields(&self) -> Option<&Map<String, Value>> {
        Some(&self.custom_fields)
    }
}

/// `PATCH /v1/transactions/secureFields/{id}` — change the amount before 3-D Secure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSecureFieldsUpdate {
    pub amount: i64,
    pub currency: String,
}

impl JsonBody for RequestSecureFieldsUpdate {}

/// One sale reported for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestReconciliationsSale {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub transaction_id: String,
    pub currency: String,
    pub amount: i64,
    /// `payment`, `credit` or `card_check`.
    #[serde(rename = "type")]
    pub kind: String,
    pub refno: String,
}

impl JsonBody for RequestReconciliationsSale {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReconciliationsSales {
    pub sales: Vec<RequestReconciliationsSale>,
}

impl JsonBody for RequestReconciliationsSales {}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of `initialize` and `secure_fields_init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInitialize {
    pub transaction_id: String,
    /// Payment page URL, taken from the `Location` header.
    #[serde(skip)]
    pub location: Option<String>,
    #[serde(skip)]
    pub raw_json: Option<Bytes>,
}

impl ApiResponse for ResponseInitialize {
    fn set_raw_json(&mut self, raw: Bytes) {
        self.raw_json = Some(raw);
    }

    fn set_location(&mut self, location: String) {
        self.location = Some(location);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAuthorize {
    #[serde(default)]
    pub acquirer_authorization_code: String,
}

impl ApiResponse for ResponseAuthorize {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCardMasked {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub acquirer_authorization_code: String,
    /// Only set by `credit_authorize`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardMaskedSimple>,
}

impl ApiResponse for ResponseCardMasked {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReconciliationsSale {
    pub transaction_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sale_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_date: OffsetDateTime,
    pub match_result: String,
}

impl ApiResponse for ResponseReconciliationsSale {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseReconciliationsSales {
    #[serde(default)]
    pub items: Vec<ResponseReconciliationsSale>,
}

impl ApiResponse for ResponseReconciliationsSales {}

/// Full state of a transaction.
///
/// Returned by the status API and also delivered as the webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub transaction_id: String,
    /// `payment`, `credit` or `card_check`.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub status: Status,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub refno: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub detail: StatusDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardExtended>,
    #[serde(
        rename = "TWI",
        alias = "twi",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub twint: Option<TwintAlias>,
    #[serde(default)]
    pub history: Vec<History>,
    #[serde(skip)]
    pub raw_json: Option<Bytes>,
}

impl TransactionStatus {
    /// The payment method, if it is one of the known codes.
    pub fn parsed_payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method.as_deref()?.parse().ok()
    }
}

impl ApiResponse for TransactionStatus {
    fn set_raw_json(&mut self, raw: Bytes) {
        self.raw_json = Some(raw);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize: Option<AuthorizeDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle: Option<SettleDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<FailDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitDetail {
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeDetail {
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub acquirer_authorization_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleDetail {
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailDetail {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardExtended {
    #[serde(default)]
    pub masked: String,
    #[serde(default)]
    pub expiry_month: String,
    #[serde(default)]
    pub expiry_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CardInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    #[serde(default)]
    pub brand: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub issuer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwintAlias {
    #[serde(default)]
    pub alias: String,
}

/// One step in a transaction's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub action: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub source: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub ip: String,
}
