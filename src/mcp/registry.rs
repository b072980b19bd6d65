use serde::Serialize;
use std::collections::BTreeMap;

pub const CHAT_COMPLETION_TOOL: &str = "chat_completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    String,
}

/// JSON-Schema subset describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl SchemaNode {
    pub fn object() -> Self {
        Self {
            kind: SchemaKind::Object,
            description: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            default: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self {
            kind: SchemaKind::String,
            description: Some(description.into()),
            ..Self::object()
        }
    }

    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required_property(mut self, name: &str, schema: SchemaNode) -> Self {
        self.required.push(name.to_string());
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn optional_property(mut self, name: &str, schema: SchemaNode) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: SchemaNode,
}

/// Catalog of the tools this server exposes. Populated once, read-only after.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(default_model: &str) -> Self {
        Self {
            tools: vec![chat_completion_descriptor(default_model)],
        }
    }

    /// Tools in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Case-sensitive exact-match lookup.
    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }
}

fn chat_completion_descriptor(default_model: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: CHAT_COMPLETION_TOOL.to_string(),
        description: "Generate text using Azure OpenAI's chat completion API".to_string(),
        input_schema: SchemaNode::object()
            .required_property("prompt", SchemaNode::string("The prompt to send to the model"))
            .optional_property(
                "model",
                SchemaNode::string(format!("The model to use (default: {default_model})"))
                    .with_default(default_model),
            ),
    }
}
