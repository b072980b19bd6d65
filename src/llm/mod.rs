//! Completion backend abstraction.
//!
//! The rest of the server only sees the `CompletionBackend` trait; the Azure
//! OpenAI client is the one concrete implementation and the only place that
//! performs network I/O.

mod azure;
mod error;


pub use azure::AzureOpenAIClient;
pub use error::ApiError;

use async_trait::async_trait;

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `prompt` as a single user message and returns the generated text.
    ///
    /// An empty string means the service answered without content.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ApiError>;
}
