use thiserror::Error;

pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Model identifier used when a tool call does not name one.
/// This is independent of the configured deployment.
pub const DEFAULT_MODEL: &str = "o1-preview";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Azure OpenAI environment variables are required (missing: {})", .0.join(", "))]
    MissingVariables(Vec<&'static str>),
}

/// Settings read once at startup and handed to the backend and server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub default_model: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = get(API_KEY_VAR);
        let endpoint = get(ENDPOINT_VAR);
        let deployment = get(DEPLOYMENT_VAR);

        match (api_key, endpoint, deployment) {
            (Some(api_key), Some(endpoint), Some(deployment)) => Ok(Self {
                api_key,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                deployment,
                api_version: get(API_VERSION_VAR)
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                default_model: DEFAULT_MODEL.to_string(),
            }),
            (api_key, endpoint, deployment) => {
                let missing = [
                    (API_KEY_VAR, api_key.is_none()),
                    (ENDPOINT_VAR, endpoint.is_none()),
                    (DEPLOYMENT_VAR, deployment.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect();
                Err(ConfigError::MissingVariables(missing))
            }
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}
