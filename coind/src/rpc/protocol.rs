//! JSON-RPC 1.0 and 2.0 envelopes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::deposit_service::DepositServiceError;

/// Invalid JSON was received.
pub const RPC_PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const RPC_INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const RPC_METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const RPC_INVALID_PARAMS: i64 = -32602;
/// Internal error.
pub const RPC_INTERNAL_ERROR: i64 = -32603;
/// No block matches the lookup, as a bitcoin like node reports it.
pub const RPC_BLOCK_NOT_FOUND: i64 = -5;

/// Version tag of JSON-RPC 2.0 requests
pub const JSONRPC_2_0: &str = "2.0";

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    /// Error code
    pub code: i64,

    /// Error message
    pub message: String,
}

impl RpcError {
    /// RpcError factory
    pub fn new<M: Into<String>>(code: i64, message: M) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The request body is not a JSON-RPC request.
    pub fn parse_error<M: Into<String>>(message: M) -> Self {
        Self::new(RPC_PARSE_ERROR, message)
    }

    /// The request object lacks a method.
    pub fn invalid_request<M: Into<String>>(message: M) -> Self {
        Self::new(RPC_INVALID_REQUEST, message)
    }

    /// The method is not part of the command table.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(RPC_METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// The parameters do not match the method signature.
    pub fn invalid_params<M: Into<String>>(message: M) -> Self {
        Self::new(RPC_INVALID_PARAMS, message)
    }

    /// Any other failure.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::new(RPC_INTERNAL_ERROR, message)
    }
}

impl From<DepositServiceError> for RpcError {
    fn from(error: DepositServiceError) -> Self {
        if error.is_block_not_found() {
            Self::new(RPC_BLOCK_NOT_FOUND, error.to_string())
        } else {
            Self::internal(error.to_string())
        }
    }
}

/// A JSON-RPC request object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, absent for JSON-RPC 1.0
    #[serde(default)]
    pub jsonrpc: Option<String>,

    /// Request id: `None` when the member is absent, `Some(Value::Null)` when it is null
    #[serde(default, deserialize_with = "deserialize_present_id")]
    pub id: Option<serde_json::Value>,

    /// Method name
    pub method: String,

    /// Positional parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl RpcRequest {
    /// Parse a request body.
    pub fn parse(body: &[u8]) -> Result<Self, RpcError> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|err| RpcError::parse_error(format!("Failed to parse request: {err}")))?;

        if request.method.is_empty() {
            return Err(RpcError::invalid_request("Invalid request: empty method"));
        }

        Ok(request)
    }

    /// True for JSON-RPC 2.0 requests.
    pub fn is_version_2(&self) -> bool {
        self.jsonrpc.as_deref() == Some(JSONRPC_2_0)
    }

    /// True if the request must not be answered.
    ///
    /// JSON-RPC 2.0 requests are notifications when their id is absent. Other requests are
    /// notifications when their id is absent or null, unless `quirks` is set.
    pub fn is_notification(&self, quirks: bool) -> bool {
        if self.is_version_2() {
            self.id.is_none()
        } else {
            !quirks && self.id.as_ref().is_none_or(|id| id.is_null())
        }
    }
}

/// A JSON-RPC response, shaped after the request version.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    /// Echo of the request version, `None` for the 1.0 shape
    pub jsonrpc: Option<String>,

    /// Command outcome
    pub outcome: Result<serde_json::Value, RpcError>,

    /// Echo of the request id
    pub id: serde_json::Value,
}

impl RpcResponse {
    /// Answer to the given request.
    pub fn for_request(
        request: &RpcRequest,
        outcome: Result<serde_json::Value, RpcError>,
    ) -> Self {
        Self {
            jsonrpc: request.is_version_2().then(|| JSONRPC_2_0.to_string()),
            outcome,
            id: request.id.clone().unwrap_or_default(),
        }
    }

    /// Answer to a body that could not be parsed as a request.
    pub fn for_unparsable_request(error: RpcError) -> Self {
        Self {
            jsonrpc: None,
            outcome: Err(error),
            id: serde_json::Value::Null,
        }
    }
}

impl Serialize for RpcResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.jsonrpc {
            Some(version) => {
                let mut state = serializer.serialize_struct("RpcResponse", 3)?;
                state.serialize_field("jsonrpc", version)?;
                match &self.outcome {
                    Ok(result) => state.serialize_field("result", result)?,
                    Err(error) => state.serialize_field("error", error)?,
                }
                state.serialize_field("id", &self.id)?;
                state.end()
            }
            None => {
                let mut state = serializer.serialize_struct("RpcResponse", 3)?;
                state.serialize_field("result", &self.outcome.as_ref().ok())?;
                state.serialize_field("error", &self.outcome.as_ref().err())?;
                state.serialize_field("id", &self.id)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use coind_common::provider::ProviderError;

    use super::*;

    #[test]
    fn parse_distinguishes_absent_and_null_ids() {
        let absent = RpcRequest::parse(br#"{"method":"getblockcount","params":[]}"#).unwrap();
        let null = RpcRequest::parse(br#"{"method":"getblockcount","params":[],"id":null}"#).unwrap();
        let set = RpcRequest::parse(br#"{"method":"getblockcount","params":[],"id":7}"#).unwrap();

        assert_eq!(None, absent.id);
        assert_eq!(Some(serde_json::Value::Null), null.id);
        assert_eq!(Some(json!(7)), set.id);
    }

    #[test]
    fn parse_rejects_malformed_envelopes() {
        let error = RpcRequest::parse(b"{not json").expect_err("parse should fail");
        assert_eq!(RPC_PARSE_ERROR, error.code);

        let error = RpcRequest::parse(br#"{"params":[]}"#).expect_err("parse should fail");
        assert_eq!(RPC_PARSE_ERROR, error.code);

        let error = RpcRequest::parse(br#"{"method":"","id":1}"#).expect_err("parse should fail");
        assert_eq!(RPC_INVALID_REQUEST, error.code);
    }

    #[test]
    fn notification_rules() {
        let request = |body: &str| RpcRequest::parse(body.as_bytes()).unwrap();

        let v2_without_id = request(r#"{"jsonrpc":"2.0","method":"m"}"#);
        assert!(v2_without_id.is_notification(true));
        assert!(v2_without_id.is_notification(false));

        let v2_with_null_id = request(r#"{"jsonrpc":"2.0","method":"m","id":null}"#);
        assert!(!v2_with_null_id.is_notification(false));

        let v1_with_null_id = request(r#"{"method":"m","id":null}"#);
        assert!(!v1_with_null_id.is_notification(true));
        assert!(v1_with_null_id.is_notification(false));

        let v1_without_id = request(r#"{"method":"m"}"#);
        assert!(!v1_without_id.is_notification(true));
        assert!(v1_without_id.is_notification(false));

        let v1_with_id = request(r#"{"method":"m","id":"abc"}"#);
        assert!(!v1_with_id.is_notification(false));
    }

    #[test]
    fn version_1_response_shape_has_every_member() {
        let request = RpcRequest::parse(br#"{"method":"getblockcount","id":1}"#).unwrap();

        let success = RpcResponse::for_request(&request, Ok(json!(12)));
        let failure =
            RpcResponse::for_request(&request, Err(RpcError::method_not_found("getblockcount")));

        assert_eq!(
            json!({"result": 12, "error": null, "id": 1}),
            serde_json::to_value(success).unwrap()
        );
        assert_eq!(
            json!({
                "result": null,
                "error": {"code": -32601, "message": "Method not found: getblockcount"},
                "id": 1
            }),
            serde_json::to_value(failure).unwrap()
        );
    }

    #[test]
    fn version_2_response_shape_has_result_or_error() {
        let request =
            RpcRequest::parse(br#"{"jsonrpc":"2.0","method":"getblockcount","id":"a"}"#).unwrap();

        let success = RpcResponse::for_request(&request, Ok(json!(12)));
        let failure = RpcResponse::for_request(&request, Err(RpcError::internal("boom")));

        assert_eq!(
            json!({"jsonrpc": "2.0", "result": 12, "id": "a"}),
            serde_json::to_value(success).unwrap()
        );
        assert_eq!(
            json!({"jsonrpc": "2.0", "error": {"code": -32603, "message": "boom"}, "id": "a"}),
            serde_json::to_value(failure).unwrap()
        );
    }

    #[test]
    fn quirk_answer_to_an_id_less_request_has_a_null_id() {
        let request = RpcRequest::parse(br#"{"method":"getblockcount"}"#).unwrap();

        let response = RpcResponse::for_request(&request, Ok(json!(3)));

        assert_eq!(serde_json::Value::Null, response.id);
    }

    #[test]
    fn deposit_service_errors_map_to_node_codes() {
        let not_found: RpcError = DepositServiceError::Provider(ProviderError::BlockNotFound).into();
        let unsupported: RpcError = DepositServiceError::UnsupportedCoinType("ETH".to_string()).into();

        assert_eq!(RpcError::new(RPC_BLOCK_NOT_FOUND, "Block not found"), not_found);
        assert_eq!(
            RpcError::new(RPC_INTERNAL_ERROR, "CoinType (ETH) not supported"),
            unsupported
        );
    }
}
