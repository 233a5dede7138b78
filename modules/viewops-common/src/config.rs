use std::env;

use tracing::info;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Hasura
    pub hasura_endpoint: String,
    pub hasura_admin_secret: String,

    // OpenAI
    pub openai_api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from environment variables, after filling in any
    /// that are unset from a `.env` file in the working directory or its parents.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| panic!("{key} environment variable is required"))
        };

        Self {
            hasura_endpoint: required("HASURA_ENDPOINT"),
            hasura_admin_secret: required("HASURA_ADMIN_SECRET"),
            openai_api_key: required("OPENAI_API_KEY"),
            chat_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: lookup("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimensions: lookup("EMBEDDING_DIMENSIONS")
                .map(|v| v.parse().expect("EMBEDDING_DIMENSIONS must be a number"))
                .unwrap_or(DEFAULT_EMBEDDING_DIMENSIONS),
            api_host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: lookup("API_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
        }
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            hasura_endpoint = self.hasura_endpoint.as_str(),
            hasura_admin_secret = redact(&self.hasura_admin_secret).as_str(),
            openai_api_key = redact(&self.openai_api_key).as_str(),
            chat_model = self.chat_model.as_str(),
            embedding_model = self.embedding_model.as_str(),
            embedding_dimensions = self.embedding_dimensions,
            api_host = self.api_host.as_str(),
            api_port = self.api_port,
            "Configuration loaded"
        );
    }
}

/// Keep the last four characters of a secret, mask the rest.
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
