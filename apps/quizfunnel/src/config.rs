//! # Configuration
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! database = "quizfunnel.redb"
//!
//! [generator]
//! model = "gpt-4o-mini"
//! timeout_ms = 30000
//!
//! [render]
//! template = "with_call_to_action"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QUIZFUNNEL_HOST` | `server.host` |
//! | `QUIZFUNNEL_PORT` | `server.port` |
//! | `QUIZFUNNEL_DATABASE` | `storage.database` |
//! | `OPENAI_API_KEY` | `generator.api_key` |
//! | `QUIZFUNNEL_LLM_URL` | `generator.base_url` |
//! | `QUIZFUNNEL_LLM_MODEL` | `generator.model` |
//! | `QUIZFUNNEL_LLM_TIMEOUT_MS` | `generator.timeout_ms` |
//! | `QUIZFUNNEL_TEMPLATE` | `render.template` |

use quizfunnel_core::{QuizError, TemplateVersion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
    pub render: RenderConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where responses are stored. No path means in-memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: Option<PathBuf>,
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Without a key the service is disabled and every result is fallback.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            max_tokens: 800,
            timeout_ms: 30_000,
        }
    }
}

/// Fallback rendering settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub template: TemplateVersion,
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, QuizError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, QuizError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            QuizError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(QuizError::Config(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            QuizError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, QuizError> {
        toml::from_str(text).map_err(|e| QuizError::Config(e.to_string()))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests). Blank values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), QuizError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("QUIZFUNNEL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("QUIZFUNNEL_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| QuizError::Config(format!("invalid QUIZFUNNEL_PORT '{}'", port)))?;
        }
        if let Some(database) = get("QUIZFUNNEL_DATABASE") {
            self.storage.database = Some(PathBuf::from(database));
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.generator.api_key = Some(key);
        }
        if let Some(url) = get("QUIZFUNNEL_LLM_URL") {
            self.generator.base_url = url;
        }
        if let Some(model) = get("QUIZFUNNEL_LLM_MODEL") {
            self.generator.model = model;
        }
        if let Some(timeout) = get("QUIZFUNNEL_LLM_TIMEOUT_MS") {
            self.generator.timeout_ms = timeout.trim().parse().map_err(|_| {
                QuizError::Config(format!("invalid QUIZFUNNEL_LLM_TIMEOUT_MS '{}'", timeout))
            })?;
        }
        if let Some(template) = get("QUIZFUNNEL_TEMPLATE") {
            self.render.template = template.parse()?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
