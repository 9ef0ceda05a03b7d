use crate::error::{AppError, Result};
use crate::models::HomeSelection;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIBBER_ENDPOINT: &str = "https://api.tibber.com/v1-beta/gql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub tibber: TibberConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret compared against the `api-key` query parameter
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TibberConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Personal access token sent as bearer auth
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub home_selection: HomeSelection,
}

fn default_endpoint() -> String {
    DEFAULT_TIBBER_ENDPOINT.into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a YAML file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Expand environment variables in the format $(VAR_NAME)
        let expanded = expand_env_vars(&content);

        let mut config: Config = serde_yaml::from_str(&expanded)?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Build configuration purely from the process environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("AUTH_API_KEY")
            .map_err(|_| AppError::Config("AUTH_API_KEY must be set".to_string()))?;
        let token = std::env::var("TIBBER_PAT")
            .map_err(|_| AppError::Config("TIBBER_PAT must be set".to_string()))?;

        let mut config = Config {
            server: ServerConfig::default(),
            auth: AuthConfig { api_key },
            tibber: TibberConfig {
                endpoint: default_endpoint(),
                token,
                timeout_secs: default_timeout_secs(),
                home_selection: HomeSelection::default(),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Ok(api_key) = std::env::var("AUTH_API_KEY") {
            self.auth.api_key = api_key;
        }
        if let Ok(token) = std::env::var("TIBBER_PAT") {
            self.tibber.token = token;
        }
        if let Ok(endpoint) = std::env::var("TIBBER_ENDPOINT") {
            self.tibber.endpoint = endpoint;
        }
        if let Ok(timeout) = std::env::var("TIBBER_TIMEOUT_SECS") {
            self.tibber.timeout_secs = timeout.parse().map_err(|_| {
                AppError::Config(format!("TIBBER_TIMEOUT_SECS is not a number: {}", timeout))
            })?;
        }
        if let Ok(selection) = std::env::var("TIBBER_HOME_SELECTION") {
            self.tibber.home_selection = selection.parse()?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("Server port cannot be 0".to_string()));
        }

        if self.auth.api_key.is_empty() {
            return Err(AppError::Config("auth.api_key cannot be empty".to_string()));
        }

        if self.tibber.token.is_empty() {
            return Err(AppError::Config("tibber.token cannot be empty".to_string()));
        }

        if !(self.tibber.endpoint.starts_with("http://")
            || self.tibber.endpoint.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "tibber.endpoint must be an http(s) URL: {}",
                self.tibber.endpoint
            )));
        }

        if self.tibber.timeout_secs == 0 {
            return Err(AppError::Config(
                "tibber.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand environment variables in the format $(VAR_NAME)
fn expand_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\(([A-Z_][A-Z0-9_]*)\)").expect("static regex");

    re.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
