//! JSON-RPC 2.0 envelopes carried inside netstring frames.
//!
//! ```text
//! request:  {"jsonrpc":"2.0","id":0,"method":"yeti.ping","params":[]}
//! response: {"jsonrpc":"2.0","id":0,"result":"pong"}
//!           {"jsonrpc":"2.0","id":0,"error":{"code":-32601,"message":"..."}}
//! ```

use crate::config::ClientConfig;
use crate::error::{Result, RpcClientError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Correlation id chosen by the caller and echoed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl RequestId {
    pub fn to_value(&self) -> Value {
        match self {
            RequestId::Number(n) => Value::Number((*n).into()),
            RequestId::String(s) => Value::String(s.clone()),
        }
    }

    /// Whether a response id refers to this request.
    pub fn matches(&self, id: &Value) -> bool {
        match (self, id) {
            (RequestId::Number(n), Value::Number(other)) => other.as_u64() == Some(*n),
            (RequestId::String(s), Value::String(other)) => s == other,
            _ => false,
        }
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId::String(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// JSON-RPC 2.0 request. All four fields are always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Create a request for `prefix + method`.
    ///
    /// The caller-supplied method name must be non-empty.
    pub fn new(
        prefix: &str,
        method: &str,
        params: Vec<Value>,
        id: impl Into<RequestId>,
    ) -> Result<Self> {
        if method.is_empty() {
            return Err(RpcClientError::InvalidRequest {
                message: "method name must not be empty".to_string(),
            });
        }

        Ok(Self {
            jsonrpc: ClientConfig::JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: format!("{}{}", prefix, method),
            params,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RpcClientError::InvalidRequest {
            message: format!("failed to serialize request: {}", e),
        })
    }
}

/// Parsed JSON-RPC 2.0 response, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub id: Value,
    pub result: Option<Value>,
    pub error: Option<Value>,
    /// The full envelope as received, unknown fields included.
    pub envelope: Value,
}

impl RpcResponse {
    /// Parse a decoded frame payload.
    ///
    /// Fails with `MalformedResponse` if the payload is not JSON or not a
    /// JSON object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let envelope: Value = serde_json::from_slice(bytes)?;
        let map = match &envelope {
            Value::Object(map) => map,
            other => {
                return Err(RpcClientError::MalformedResponse {
                    message: format!("expected a JSON object, got {}", json_type_name(other)),
                })
            }
        };

        Ok(Self {
            id: map.get("id").cloned().unwrap_or(Value::Null),
            result: map.get("result").cloned(),
            error: non_null(map, "error"),
            envelope,
        })
    }

    /// Classify the response as success or failure.
    ///
    /// A `result` member counts when it is present, whatever its value, so
    /// `false`, `0` and `null` are all successes. An `error` member counts
    /// only when it is non-null, since JSON-RPC 1.0 peers send the unused
    /// member as an explicit `null`. When both count, `result` wins unless it
    /// is `null`.
    pub fn classify(self) -> Result<RpcSuccess> {
        match (self.result, self.error) {
            (Some(result), None) => Ok(RpcSuccess {
                id: self.id,
                result,
                envelope: self.envelope,
            }),
            (Some(Value::Null), Some(error)) | (None, Some(error)) => {
                Err(RpcClientError::Rpc { error })
            }
            (Some(result), Some(error)) => {
                warn!(
                    "Response carries both result and error; using result (error was {})",
                    error
                );
                Ok(RpcSuccess {
                    id: self.id,
                    result,
                    envelope: self.envelope,
                })
            }
            (None, None) => Err(RpcClientError::MalformedResponse {
                message: format!("neither result nor error present. raw response: {}", self.envelope),
            }),
        }
    }
}

/// Successful call outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcSuccess {
    pub id: Value,
    pub result: Value,
    /// Full response envelope, for callers that print the protocol framing.
    pub envelope: Value,
}

/// Best-effort structured view of a remote error payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    /// Returns `None` when the payload is not a `{code, message}` object.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}

fn non_null(map: &Map<String, Value>, key: &str) -> Option<Value> {
    map.get(key).filter(|v| !v.is_null()).cloned()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> Result<RpcSuccess> {
        RpcResponse::from_slice(&serde_json::to_vec(&value).unwrap())
            .unwrap()
            .classify()
    }

    #[test]
    fn test_request_serialization_has_all_fields() {
        let req = RpcRequest::new("yeti.", "ping", vec![json!("a"), json!("b")], 0).unwrap();
        let value: Value = serde_json::from_slice(&req.to_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": 0, "method": "yeti.ping", "params": ["a", "b"]})
        );
    }

    #[test]
    fn test_request_empty_params_still_serialized() {
        let req = RpcRequest::new("yeti.", "ping", vec![], "abc").unwrap();
        let json = String::from_utf8(req.to_bytes().unwrap()).unwrap();
        assert!(json.contains("\"params\":[]"));
        assert!(json.contains("\"id\":\"abc\""));
    }

    #[test]
    fn test_request_rejects_empty_method() {
        let err = RpcRequest::new("yeti.", "", vec![], 0).unwrap_err();
        assert!(matches!(err, RpcClientError::InvalidRequest { .. }));
    }

    #[test]
    fn test_request_id_matching() {
        assert!(RequestId::from(7).matches(&json!(7)));
        assert!(!RequestId::from(7).matches(&json!(8)));
        assert!(!RequestId::from(7).matches(&json!("7")));
        assert!(RequestId::from("x").matches(&json!("x")));
        assert!(!RequestId::from(0).matches(&Value::Null));
    }

    #[test]
    fn test_non_object_payloads_are_malformed() {
        for payload in [&b"[1,2]"[..], b"\"pong\"", b"not json", b""] {
            let err = RpcResponse::from_slice(payload).unwrap_err();
            assert!(matches!(err, RpcClientError::MalformedResponse { .. }));
        }
    }

    #[test]
    fn test_falsy_results_are_successes() {
        for result in [json!(false), json!(0), json!(""), Value::Null, json!([])] {
            let success = classify(json!({"jsonrpc": "2.0", "id": 0, "result": result})).unwrap();
            assert_eq!(success.result, result);
        }
    }

    #[test]
    fn test_error_payload_is_kept_verbatim() {
        let error = json!({"code": -32601, "message": "method not found"});
        let err = classify(json!({"jsonrpc": "2.0", "id": 0, "error": error})).unwrap_err();
        assert_eq!(err.rpc_error(), Some(&error));

        let parsed = RpcErrorObject::from_payload(&error).unwrap();
        assert_eq!(parsed.code, -32601);
        assert_eq!(parsed.message, "method not found");
    }

    #[test]
    fn test_result_takes_precedence_over_error() {
        let success = classify(json!({
            "jsonrpc": "2.0", "id": 0, "result": "ok", "error": {"code": 1, "message": "x"}
        }))
        .unwrap();
        assert_eq!(success.result, json!("ok"));
    }

    #[test]
    fn test_null_result_with_error_is_an_error() {
        let err = classify(json!({
            "id": 0, "result": null, "error": "boom"
        }))
        .unwrap_err();
        assert_eq!(err.rpc_error(), Some(&json!("boom")));
    }

    #[test]
    fn test_neither_result_nor_error_is_malformed() {
        for value in [
            json!({"jsonrpc": "2.0", "id": 0}),
            json!({"jsonrpc": "2.0", "id": 0, "error": null}),
        ] {
            let err = classify(value).unwrap_err();
            assert!(matches!(err, RpcClientError::MalformedResponse { .. }));
        }
    }

    #[test]
    fn test_envelope_preserves_unknown_fields() {
        let success = classify(json!({"jsonrpc": "2.0", "id": 0, "result": 1, "extra": true})).unwrap();
        assert_eq!(success.envelope["extra"], json!(true));
    }
}
