use super::registry::{ToolDescriptor, ToolRegistry};
use super::types::ToolCallResult;
use super::validation::{validate, ArgumentError, ToolArguments};
use crate::llm::CompletionBackend;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const EMPTY_COMPLETION_PLACEHOLDER: &str = "No response generated";

/// A request rejected before any backend work was done.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown tool: {0}")]
    MethodNotFound(String),

    #[error("Invalid {tool} arguments: {reason}")]
    InvalidParams { tool: String, reason: ArgumentError },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    pub fn code(&self) -> i32 {
        match self {
            ProtocolError::MethodNotFound(_) => -32601,
            ProtocolError::InvalidParams { .. } => -32602,
            ProtocolError::Internal(_) => -32603,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub arguments: Option<serde_json::Value>,
}

/// Routes a tool call through lookup, validation and the backend.
pub struct Dispatcher {
    registry: ToolRegistry,
    backend: Arc<dyn CompletionBackend>,
    default_model: String,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn CompletionBackend>, default_model: impl Into<String>) -> Self {
        let default_model = default_model.into();
        Self {
            registry: ToolRegistry::new(&default_model),
            backend,
            default_model,
        }
    }

    pub fn list_tools(&self) -> &[ToolDescriptor] {
        self.registry.list()
    }

    /// Produces exactly one outcome per request. Backend failures are
    /// reported as an `is_error` result, never as a `ProtocolError`.
    pub async fn call_tool(
        &self,
        request: ToolCallRequest,
    ) -> Result<ToolCallResult, ProtocolError> {
        let tool = self
            .registry
            .find(&request.tool_name)
            .ok_or_else(|| ProtocolError::MethodNotFound(request.tool_name.clone()))?;

        let arguments = validate(&tool.name, request.arguments.as_ref(), &self.default_model)
            .map_err(|reason| ProtocolError::InvalidParams {
                tool: tool.name.clone(),
                reason,
            })?;

        match arguments {
            ToolArguments::ChatCompletion(args) => {
                debug!("Running {} with model {}", tool.name, args.model);
                match self.backend.complete(&args.prompt, &args.model).await {
                    Ok(text) if text.is_empty() => {
                        Ok(ToolCallResult::text(EMPTY_COMPLETION_PLACEHOLDER))
                    }
                    Ok(text) => Ok(ToolCallResult::text(text)),
                    Err(e) => {
                        warn!("Chat completion failed: {}", e);
                        Ok(ToolCallResult::error(format!("Azure OpenAI API error: {e}")))
                    }
                }
            }
        }
    }
}
