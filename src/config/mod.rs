use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::summarize::ollama::{DEFAULT_HOST, DEFAULT_PORT};
use crate::transcript::captions::TrackPreference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Ollama connection and model settings
    pub ollama: OllamaConfig,

    /// Transcript retrieval settings
    pub transcripts: TranscriptConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub host: String,

    /// Model selected when a session starts
    pub default_model: String,

    /// Models offered in the interactive model picker
    pub models: Vec<String>,

    /// Request timeout in seconds (no timeout if unset)
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Path to the yt-dlp executable
    pub yt_dlp_path: String,

    /// Preferred caption languages, in order
    pub languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig {
                host: DEFAULT_HOST.to_string(),
                default_model: "llama2".to_string(),
                models: ["llama2", "mistral", "qwen3:8b", "qwen3:32b"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                request_timeout_secs: None,
            },
            transcripts: TranscriptConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                languages: vec!["en".to_string()],
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path, writing defaults if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs_err::read_to_string(config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-summarizer").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let host = url::Url::parse(&self.ollama.host)
            .with_context(|| format!("Invalid Ollama host: {}", self.ollama.host))?;
        if !matches!(host.scheme(), "http" | "https") {
            anyhow::bail!("Ollama host must use HTTP or HTTPS protocol");
        }

        if self.ollama.default_model.trim().is_empty() {
            anyhow::bail!("A default Ollama model must be configured");
        }

        if self.transcripts.languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Ollama Host: {}", self.ollama.host);
        println!("  Default Model: {}", self.ollama.default_model);
        println!("  Models: {}", self.ollama.models.join(", "));
        match self.ollama.request_timeout_secs {
            Some(secs) => println!("  Request Timeout: {}s", secs),
            None => println!("  Request Timeout: none"),
        }
        println!("  yt-dlp: {}", self.transcripts.yt_dlp_path);
        println!("  Languages: {}", self.transcripts.languages.join(", "));
    }

    /// Use a different Ollama host, as given by `--ollama-host` or `OLLAMA_HOST`.
    ///
    /// A missing scheme means http, and a plain-http host without a port
    /// gets Ollama's default port (`0.0.0.0` becomes `http://0.0.0.0:11434`).
    pub fn override_host(&mut self, host: &str) -> Result<()> {
        let host = host.trim().trim_end_matches('/');
        let (scheme, rest) = host.split_once("://").unwrap_or(("http", host));
        let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));

        self.ollama.host = if scheme.eq_ignore_ascii_case("http") && !has_explicit_port(authority) {
            format!("{}://{}:{}{}", scheme, authority, DEFAULT_PORT, path)
        } else {
            format!("{}://{}{}", scheme, authority, path)
        };
        self.validate()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.ollama.request_timeout_secs.map(Duration::from_secs)
    }

    /// Caption track preference; explicit languages disable the first-available fallback
    pub fn track_preference(&self, languages: &[String]) -> TrackPreference {
        if languages.is_empty() {
            TrackPreference {
                languages: self.transcripts.languages.clone(),
                allow_fallback: true,
            }
        } else {
            TrackPreference {
                languages: languages.to_vec(),
                allow_fallback: false,
            }
        }
    }

    /// Model candidates for the picker, always including the default
    pub fn model_candidates(&self) -> Vec<String> {
        let mut models = self.ollama.models.clone();
        if !models.contains(&self.ollama.default_model) {
            models.insert(0, self.ollama.default_model.clone());
        }
        models
    }
}

/// Whether `host[:port]` carries a port; IPv6 literals keep their colons in brackets
fn has_explicit_port(authority: &str) -> bool {
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let host_port = host_port.rsplit(']').next().unwrap_or(host_port);

    host_port.rsplit_once(':').is_some_and(|(_, port)| {
        !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
    })
}
