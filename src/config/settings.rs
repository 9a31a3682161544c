//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::APP_NAME;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Summary pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Outbound email settings
    #[serde(default)]
    pub smtp: SmtpSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (groq, gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name (empty = provider default)
    #[serde(default)]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed generation call (0 = no retry)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries; attempt n waits n times this
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Approximate token budget per transcript chunk
    #[serde(default = "default_chunk_budget")]
    pub chunk_budget: usize,

    /// Partial summaries generated at once (1 = sequential)
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address for `recap serve`
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Expected `x-username` header (empty = auth disabled)
    #[serde(default)]
    pub username: String,

    /// Expected `x-password` header
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP relay port (STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP login
    #[serde(default)]
    pub username: String,

    /// SMTP password
    #[serde(default)]
    pub password: String,

    /// Sender address (empty = SMTP login)
    #[serde(default)]
    pub from: String,

    /// Connection timeout in seconds
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("~/.local/share/{}", APP_NAME)))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "groq".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_chunk_budget() -> usize {
    crate::summary::DEFAULT_CHUNK_BUDGET
}

fn default_max_concurrent_chunks() -> usize {
    1
}

fn default_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout_secs() -> u64 {
    10
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_budget: default_chunk_budget(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Parse settings from TOML text, filling missing keys with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.trim().is_empty() {
            let provider_key = match self.llm.provider.to_lowercase().as_str() {
                "gemini" => "GEMINI_API_KEY",
                _ => "GROQ_API_KEY",
            };
            if let Some(key) = lookup("RECAP_LLM_API_KEY").or_else(|| lookup(provider_key)) {
                self.llm.api_key = key;
            }
        }

        if let Some(model) = lookup("GROQ_MODEL") {
            if self.llm.provider.eq_ignore_ascii_case("groq") {
                self.llm.model = model;
            }
        }

        if let Some(addr) = lookup("RECAP_ADDR") {
            self.server.addr = addr;
        }
        if let Some(username) = lookup("RECAP_USERNAME") {
            self.server.username = username;
        }
        if let Some(password) = lookup("RECAP_PASSWORD") {
            self.server.password = password;
        }

        if let Some(host) = lookup("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = lookup("SMTP_PORT") {
            match port.trim().parse() {
                Ok(port) => self.smtp.port = port,
                Err(_) => tracing::warn!("Ignoring invalid SMTP_PORT value: {}", port),
            }
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.smtp.username = user;
        }
        if let Some(pass) = lookup("SMTP_PASS") {
            self.smtp.password = pass;
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join(format!("{}.db", APP_NAME))
    }

    /// Whether the HTTP server should check credential headers
    pub fn auth_enabled(&self) -> bool {
        !self.server.username.is_empty() || !self.server.password.is_empty()
    }

    /// Sender address for outgoing mail
    pub fn smtp_sender(&self) -> &str {
        if self.smtp.from.trim().is_empty() {
            &self.smtp.username
        } else {
            &self.smtp.from
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn database_lives_in_data_dir() {
        let mut settings = Settings::default();
        settings.general.data_dir = PathBuf::from("/var/lib/notes");
        assert_eq!(
            settings.database_path(),
            PathBuf::from(format!("/var/lib/notes/{}.db", APP_NAME))
        );
    }

    #[test]
    fn defaults_to_groq_provider() {
        let settings = Settings::default();
        assert_eq!(settings.llm.provider, "groq");
        assert!(settings.llm.model.is_empty());
        assert_eq!(settings.pipeline.chunk_budget, 1200);
        assert_eq!(settings.pipeline.max_concurrent_chunks, 1);
        assert_eq!(settings.smtp.port, 587);
        assert!(!settings.auth_enabled());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [pipeline]
            chunk_budget = 300

            [server]
            username = "alice"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.pipeline.chunk_budget, 300);
        assert_eq!(settings.pipeline.max_concurrent_chunks, 1);
        assert_eq!(settings.llm.max_retries, 2);
        assert!(settings.auth_enabled());
    }

    #[test]
    fn env_overrides_fill_blank_values() {
        let mut settings = Settings::default();
        settings.apply_overrides(env(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_MODEL", "llama-3.3-70b"),
            ("SMTP_USER", "bot@example.com"),
            ("SMTP_PORT", "2525"),
        ]));

        assert_eq!(settings.llm.api_key, "gsk_test");
        assert_eq!(settings.llm.model, "llama-3.3-70b");
        assert_eq!(settings.smtp.username, "bot@example.com");
        assert_eq!(settings.smtp.port, 2525);
        assert_eq!(settings.smtp_sender(), "bot@example.com");
    }

    #[test]
    fn configured_api_key_wins_over_env() {
        let mut settings = Settings::default();
        settings.llm.api_key = "from-config".to_string();
        settings.apply_overrides(env(&[("RECAP_LLM_API_KEY", "from-env")]));
        assert_eq!(settings.llm.api_key, "from-config");
    }

    #[test]
    fn gemini_reads_its_own_key() {
        let mut settings = Settings::default();
        settings.llm.provider = "gemini".to_string();
        settings.apply_overrides(env(&[
            ("GROQ_API_KEY", "wrong"),
            ("GEMINI_API_KEY", "right"),
            ("GROQ_MODEL", "ignored"),
        ]));
        assert_eq!(settings.llm.api_key, "right");
        assert!(settings.llm.model.is_empty());
    }

    #[test]
    fn invalid_smtp_port_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(env(&[("SMTP_PORT", "not-a-port")]));
        assert_eq!(settings.smtp.port, 587);
    }
}
