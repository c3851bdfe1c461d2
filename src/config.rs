//! Application configuration.
//!
//! Settings are read from `$XDG_CONFIG_HOME/vpdt-digest/config.toml` when it
//! exists, then overridden from the environment. A `.env` file in the working
//! directory is loaded first, so secrets can live there instead of the shell.
//!
//! | Variable | Overrides |
//! |---|---|
//! | `VPDT_PORTAL_URL` | `portal.base_url` |
//! | `VPDT_API_URL` | `portal.api_url` |
//! | `VPDT_REFRESH_TOKEN`, `REFRESH_TOKEN` | `portal.refresh_token` |
//! | `VPDT_LLM_API_KEY`, `GROQ_API_KEY` | `summary.llm_api_key` |
//! | `VPDT_LLM_MODEL` | `summary.llm_model` |

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(vpdt::config::read),
        help("Ensure the config file is readable, or remove it to use the defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(vpdt::config::parse),
        help("Check the TOML syntax. Known sections are [portal] and [summary].")
    )]
    Parse { path: String, message: String },

    #[error("{name} is not configured")]
    #[diagnostic(
        code(vpdt::config::missing_secret),
        help("Set {env} in the environment or in a .env file next to where you run vpdt.")
    )]
    MissingSecret { name: String, env: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A credential that must never appear in logs or debug output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Connection settings for the e-office portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Landing page that serves the login form.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Root of the JSON API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Transport timeout per request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Staff post outbound detail records are read as. Defaults to the
    /// logged-in user's first post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_staff_id: Option<String>,
    /// Long-lived token exchanged for access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Secret>,
}

fn default_base_url() -> String {
    "https://vpdt.angiang.gov.vn".into()
}
fn default_api_url() -> String {
    "https://angiang-api.vnptioffice.vn/api".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/127.0.0.0 Safari/537.36 Edg/127.0.0.0"
        .into()
}
fn default_accept_language() -> String {
    "vi,en-US;q=0.9,en;q=0.8".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
            detail_staff_id: None,
            refresh_token: None,
        }
    }
}

impl PortalConfig {
    /// The refresh token, or a diagnostic naming the variable to set.
    pub fn require_refresh_token(&self) -> ConfigResult<&str> {
        match &self.refresh_token {
            Some(token) if !token.is_empty() => Ok(token.expose()),
            _ => Err(ConfigError::MissingSecret {
                name: "portal refresh token".into(),
                env: "VPDT_REFRESH_TOKEN".into(),
            }),
        }
    }
}

/// Settings for the summary pipeline collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// OpenAI-compatible API root.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Extracted text beyond this many characters is not sent to the model.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,
    #[serde(default = "default_tts_lang")]
    pub tts_lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_api_key: Option<Secret>,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_llm_model() -> String {
    "llama3-70b-8192".into()
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_max_input_chars() -> usize {
    24_000
}
fn default_tts_base_url() -> String {
    "https://translate.google.com/translate_tts".into()
}
fn default_tts_lang() -> String {
    "vi".into()
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_timeout_secs: default_llm_timeout_secs(),
            max_input_chars: default_max_input_chars(),
            tts_base_url: default_tts_base_url(),
            tts_lang: default_tts_lang(),
            llm_api_key: None,
        }
    }
}

impl SummaryConfig {
    pub fn require_api_key(&self) -> ConfigResult<&str> {
        match &self.llm_api_key {
            Some(key) if !key.is_empty() => Ok(key.expose()),
            _ => Err(ConfigError::MissingSecret {
                name: "language model API key".into(),
                env: "GROQ_API_KEY".into(),
            }),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load the file, then apply `.env` and process environment overrides.
    pub fn load_with_env(path: &Path) -> ConfigResult<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(url) = first(&["VPDT_PORTAL_URL"]) {
            self.portal.base_url = url;
        }
        if let Some(url) = first(&["VPDT_API_URL"]) {
            self.portal.api_url = url;
        }
        if let Some(token) = first(&["VPDT_REFRESH_TOKEN", "REFRESH_TOKEN"]) {
            self.portal.refresh_token = Some(Secret::new(token));
        }
        if let Some(key) = first(&["VPDT_LLM_API_KEY", "GROQ_API_KEY"]) {
            self.summary.llm_api_key = Some(Secret::new(key));
        }
        if let Some(model) = first(&["VPDT_LLM_MODEL"]) {
            self.summary.llm_model = model;
        }
    }
}
