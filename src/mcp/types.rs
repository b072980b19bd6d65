use super::registry::ToolDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Request id as sent by the client. Numbers are kept as `serde_json::Number`
/// so ids outside the `i64` range echo back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
pub struct JSONRPCRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct JSONRPCNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug)]
pub enum JSONRPCMessage {
    Request(JSONRPCRequest),
    Notification(JSONRPCNotification),
}

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),

    /// An `id` was present but is neither a string nor a number.
    #[error("Invalid request id: {0}")]
    InvalidId(Value),

    #[error("Invalid request: {1}")]
    InvalidRequest(RequestId, serde_json::Error),

    #[error("Invalid notification: {0}")]
    InvalidNotification(serde_json::Error),
}

impl JSONRPCMessage {
    /// Any message carrying an `id` key is a request; only messages
    /// without one are notifications.
    pub fn parse(message: &str) -> Result<Self, MessageError> {
        let raw: Value = serde_json::from_str(message).map_err(MessageError::Parse)?;

        match raw.get("id").cloned() {
            Some(raw_id) => {
                let id: RequestId = serde_json::from_value(raw_id.clone())
                    .map_err(|_| MessageError::InvalidId(raw_id))?;
                serde_json::from_value(raw)
                    .map(JSONRPCMessage::Request)
                    .map_err(|e| MessageError::InvalidRequest(id, e))
            }
            None => serde_json::from_value(raw)
                .map(JSONRPCMessage::Notification)
                .map_err(MessageError::InvalidNotification),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JSONRPCResponse<T> {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct JSONRPCError {
    pub jsonrpc: String,
    /// Serialized as `null` when the request id could not be determined.
    pub id: Option<RequestId>,
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct EmptyResult {}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

// Initialize request/response types
#[derive(Debug, Deserialize)]
pub struct InitializeParams {
    #[serde(default)]
    pub capabilities: serde_json::Value,
    #[serde(rename = "clientInfo", default)]
    pub client_info: Option<Implementation>,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// Tool types
#[derive(Debug, Serialize)]
pub struct ListToolsResult<'a> {
    pub tools: &'a [ToolDescriptor],
}

#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolResultContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResultContent {
    #[serde(rename = "text")]
    Text { text: String },
}
