use super::error::{ApiError, Result};
use super::CompletionBackend;
use crate::config::ServerConfig;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions against an Azure OpenAI deployment.
pub struct AzureOpenAIClient {
    client: Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
}

impl AzureOpenAIClient {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn get_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    async fn check_response_error(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let response_text = response.text().await?;
        warn!("Azure OpenAI request failed with status {}", status);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Authentication(response_text)
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                ApiError::InvalidRequest(response_text)
            }
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(response_text),
            status if status.is_server_error() => ApiError::ServiceError(response_text),
            _ => ApiError::Unknown(format!("Status {status}: {response_text}")),
        })
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAIClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            model,
        };

        debug!(
            "Sending chat completion to deployment {} (model {})",
            self.deployment, model
        );

        let response = self
            .client
            .post(self.get_url())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_response_error(response).await?;

        let body = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{e}: {body}")))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidResponse("No choices in response".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
