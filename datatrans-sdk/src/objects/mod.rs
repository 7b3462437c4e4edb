//! Request and response objects of the Datatrans transaction API.

pub mod error;
pub mod payment_method;
pub mod status;
pub mod transaction;

pub use error::{ErrorDetail, ErrorResponse};
pub use payment_method::PaymentMethod;
pub use status::Status;
pub use transaction::*;

use bytes::Bytes;
use serde_json::{Map, Value};

/// A string that does not name any known enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// A request body that may carry extra top-level JSON fields.
///
/// Extra fields are merged into the serialized struct and win over fields of
/// the same name, so callers can send API parameters this crate does not
/// model yet.
pub trait JsonBody: serde::Serialize {
    fn custom_fields(&self) -> Option<&Map<String, Value>> {
        None
    }
}

/// A response object that keeps data from outside its JSON fields.
pub trait ApiResponse: serde::de::DeserializeOwned {
    /// Receives the undecoded response body.
    fn set_raw_json(&mut self, _raw: Bytes) {}

    /// Receives the `Location` response header.
    fn set_location(&mut self, _location: String) {}
}

impl ApiResponse for () {}

/// Serialize `body` to JSON, merging in its custom fields.
pub fn marshal_json<T: JsonBody>(body: &T) -> Result<Vec<u8>, serde_json::Error> {
    let Some(extra) = body.custom_fields().filter(|fields| !fields.is_empty()) else {
        return serde_json::to_vec(body);
    };

    let mut value = serde_json::to_value(body)?;
    if let Value::Object(map) = &mut value {
        for (k, v) in extra {
            map.insert(k.clone(), v.clone());
        }
    }
    serde_json::to_vec(&value)
}
