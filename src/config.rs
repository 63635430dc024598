use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base endpoint every collection path is appended to (e.g. `https://cms.example.org/api`).
    pub base_url: String,
    /// Bearer token forwarded on every request. Issued elsewhere; never refreshed here.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = std::env::var("CMS_API_URL")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ApiConfig::default().base_url);

        let token = std::env::var("CMS_API_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let config = Config {
            api: ApiConfig { base_url, token },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "CMS_API_URL '{}' is not a valid URL: {e}",
                self.api.base_url
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "CMS_API_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.scheme() == "http" && self.api.token.is_some() {
            tracing::warn!(
                "CMS_API_TOKEN is set but CMS_API_URL is plain http. \
                 The token will be sent unencrypted."
            );
        }

        Ok(())
    }
}
