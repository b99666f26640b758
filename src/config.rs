use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    /// Directory with the built single-page frontend, served for unmatched paths.
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(alias = "tokenttl", default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(alias = "bcryptcost", default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_ttl_secs: default_token_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(alias = "apikey", default)]
    pub api_key: Option<String>,
    #[serde(alias = "baseurl", default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(alias = "timeout", default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            language: default_language(),
            region: default_region(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_port() -> String {
    "5001".to_string()
}

fn default_token_ttl() -> u64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "ko-KR".to_string()
}

fn default_region() -> String {
    "KR".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(origin: &str, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(origin.to_string(), e))
    }

    /// Like `from_file`, but a missing file gives the defaults when
    /// `optional` is set.
    pub fn load(path: &str, optional: bool) -> Result<Self, ConfigError> {
        if optional && !Path::new(path).exists() {
            return Ok(Config::default());
        }
        Self::from_file(path)
    }

    /// Apply `PORT`, `SECRET_KEY`, `TMDB_API_KEY` and `TMDB_BASE_URL`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.listen.port = port;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret = Some(secret);
        }
        if let Some(key) = lookup("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(url) = lookup("TMDB_BASE_URL") {
            self.tmdb.base_url = url;
        }
    }

    pub fn token_secret(&self) -> Result<&str, ConfigError> {
        self.auth
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("No token secret configured (auth.secret or SECRET_KEY)")]
    MissingSecret,
}
