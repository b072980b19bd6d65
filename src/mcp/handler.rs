use super::dispatcher::{Dispatcher, ProtocolError, ToolCallRequest};
use super::types::*;
use crate::utils::MessageWriter;
use anyhow::Result;
use tracing::{debug, error, trace};

const INVALID_REQUEST: i32 = -32600;
const INVALID_PARAMS: i32 = -32602;
const METHOD_NOT_FOUND: i32 = -32601;

pub struct MessageHandler {
    dispatcher: Dispatcher,
    message_writer: Box<dyn MessageWriter>,
}

impl MessageHandler {
    pub fn new(dispatcher: Dispatcher, message_writer: Box<dyn MessageWriter>) -> Self {
        Self {
            dispatcher,
            message_writer,
        }
    }

    /// Sends a JSON-RPC response
    async fn send_response<T: serde::Serialize>(&mut self, id: RequestId, result: T) -> Result<()> {
        let response = JSONRPCResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        };
        self.send_message(&serde_json::to_value(response)?).await
    }

    /// Sends a JSON-RPC error response
    async fn send_error(&mut self, id: RequestId, code: i32, message: String) -> Result<()> {
        self.send_error_object(Some(id), code, message).await
    }

    async fn send_error_object(
        &mut self,
        id: Option<RequestId>,
        code: i32,
        message: String,
    ) -> Result<()> {
        let error = JSONRPCError {
            jsonrpc: "2.0".to_string(),
            id,
            error: ErrorObject {
                code,
                message,
                data: None,
            },
        };
        self.send_message(&serde_json::to_value(error)?).await
    }

    async fn send_protocol_error(&mut self, id: RequestId, fault: ProtocolError) -> Result<()> {
        self.send_error(id, fault.code(), fault.to_string()).await
    }

    async fn send_message(&mut self, message: &serde_json::Value) -> Result<()> {
        let message_str = serde_json::to_string(message)?;
        debug!("Sending message: {}", message_str);
        self.message_writer.write_message(&message_str).await
    }

    async fn handle_initialize(
        &mut self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> Result<()> {
        let params: InitializeParams = match serde_json::from_value(params.unwrap_or_default()) {
            Ok(params) => params,
            Err(e) => {
                return self
                    .send_error(id, INVALID_PARAMS, format!("Invalid initialize parameters: {e}"))
                    .await;
            }
        };

        match &params.client_info {
            Some(client) => debug!(
                "Initialize from {} {} (protocol {})",
                client.name, client.version, params.protocol_version
            ),
            None => debug!("Initialize (protocol {})", params.protocol_version),
        }
        trace!("Client capabilities: {}", params.capabilities);

        self.send_response(
            id,
            InitializeResult {
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: Some(false),
                    },
                },
                protocol_version: params.protocol_version,
                server_info: Implementation {
                    name: "azure-openai-server".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                instructions: Some(
                    "Generates text with an Azure OpenAI chat completion deployment.".to_string(),
                ),
            },
        )
        .await
    }

    async fn handle_tools_list(&mut self, id: RequestId) -> Result<()> {
        debug!("Handling tools/list request");
        let result = serde_json::to_value(ListToolsResult {
            tools: self.dispatcher.list_tools(),
        })?;
        self.send_response(id, result).await
    }

    async fn handle_tool_call(
        &mut self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> Result<()> {
        let params: ToolCallParams = match serde_json::from_value(params.unwrap_or_default()) {
            Ok(params) => params,
            Err(e) => {
                return self
                    .send_error(id, INVALID_PARAMS, format!("Invalid tool call parameters: {e}"))
                    .await;
            }
        };
        debug!("Handling tool call for {}", params.name);

        let request = ToolCallRequest {
            tool_name: params.name,
            arguments: params.arguments,
        };
        match self.dispatcher.call_tool(request).await {
            Ok(result) => self.send_response(id, result).await,
            Err(fault) => {
                debug!("Tool call rejected: {}", fault);
                self.send_protocol_error(id, fault).await
            }
        }
    }

    async fn handle_request(
        &mut self,
        id: RequestId,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<()> {
        match method {
            "initialize" => self.handle_initialize(id, params).await,
            "ping" => self.send_response(id, EmptyResult {}).await,
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tool_call(id, params).await,
            method => {
                self.send_error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
                    .await
            }
        }
    }

    /// Main message handling entry point
    pub async fn handle_message(&mut self, message: &str) -> Result<()> {
        let message = match JSONRPCMessage::parse(message) {
            Ok(msg) => msg,
            Err(MessageError::InvalidId(id)) => {
                error!("Rejecting request with unusable id: {}", id);
                return self
                    .send_error_object(None, INVALID_REQUEST, format!("Invalid request id: {id}"))
                    .await;
            }
            Err(MessageError::InvalidRequest(id, e)) => {
                error!("Invalid JSON-RPC request {:?}: {}", id, e);
                return self
                    .send_error(id, INVALID_REQUEST, format!("Invalid request: {e}"))
                    .await;
            }
            Err(e) => {
                error!("Invalid JSON-RPC message: {}", e);
                return Ok(());
            }
        };

        match message {
            JSONRPCMessage::Request(JSONRPCRequest {
                method, id, params, ..
            }) => {
                trace!("Processing request: method={}, id={:?}", method, id);
                if let Err(e) = self.handle_request(id.clone(), &method, params).await {
                    error!("Error handling {} request: {}", method, e);
                    let fault = ProtocolError::Internal(e.to_string());
                    self.send_protocol_error(id, fault).await?;
                }
            }

            JSONRPCMessage::Notification(JSONRPCNotification { method, params, .. }) => {
                match method.as_str() {
                    "notifications/initialized" => {
                        if let Some(params) = params {
                            debug!("Client initialized with params: {:?}", params);
                        } else {
                            debug!("Client initialized");
                        }
                    }
                    _ => {
                        debug!("Unknown notification: {}", method);
                    }
                }
            }
        }

        Ok(())
    }
}
