use super::registry::CHAT_COMPLETION_TOOL;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletionArgs {
    pub prompt: String,
    pub model: String,
}

/// Normalized arguments for a registered tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArguments {
    ChatCompletion(ChatCompletionArgs),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("arguments must be an object")]
    NotAnObject,

    #[error("'prompt' is required")]
    MissingPrompt,

    #[error("'prompt' must be a non-empty string")]
    InvalidPrompt,

    #[error("'model' must be a string")]
    InvalidModel,

    #[error("no argument schema for tool '{0}'")]
    UnknownTool(String),
}

/// Checks the raw argument payload of `tool_name`. Unknown fields are ignored;
/// any violation rejects the whole call.
pub fn validate(
    tool_name: &str,
    raw_arguments: Option<&Value>,
    default_model: &str,
) -> Result<ToolArguments, ArgumentError> {
    match tool_name {
        CHAT_COMPLETION_TOOL => {
            validate_chat_completion(raw_arguments, default_model).map(ToolArguments::ChatCompletion)
        }
        other => Err(ArgumentError::UnknownTool(other.to_string())),
    }
}

fn validate_chat_completion(
    raw_arguments: Option<&Value>,
    default_model: &str,
) -> Result<ChatCompletionArgs, ArgumentError> {
    let arguments = raw_arguments
        .and_then(Value::as_object)
        .ok_or(ArgumentError::NotAnObject)?;

    let prompt = match arguments.get("prompt") {
        None => return Err(ArgumentError::MissingPrompt),
        Some(Value::String(prompt)) if !prompt.is_empty() => prompt.clone(),
        Some(_) => return Err(ArgumentError::InvalidPrompt),
    };

    // An empty model string falls back to the default as well
    let model = match arguments.get("model") {
        None => default_model.to_string(),
        Some(Value::String(model)) if model.is_empty() => default_model.to_string(),
        Some(Value::String(model)) => model.clone(),
        Some(_) => return Err(ArgumentError::InvalidModel),
    };

    Ok(ChatCompletionArgs { prompt, model })
}
