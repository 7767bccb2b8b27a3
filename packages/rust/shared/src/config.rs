//! Application configuration for Trendcast.
//!
//! User config lives at `~/.trendcast/trendcast.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrendcastError};
use crate::types::ReportMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "trendcast.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".trendcast";

// ---------------------------------------------------------------------------
// Config structs (matching trendcast.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Report assembly settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// AI enrichment and rendering switches.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Text-generation service connection.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report mode: daily, current or incremental.
    #[serde(default)]
    pub mode: ReportMode,

    /// Rank at or above which a title counts as highlighted.
    #[serde(default = "default_rank_threshold")]
    pub rank_threshold: u32,

    /// Path to the frequency-word list used to filter new titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_words: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::default(),
            rank_threshold: default_rank_threshold(),
            frequency_words: None,
        }
    }
}

fn default_rank_threshold() -> u32 {
    3
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Master switch for AI enrichment.
    #[serde(default)]
    pub enabled: bool,

    /// Provider name (`zhipu` or `openai`).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Maximum summary length in characters.
    #[serde(default = "default_summary_length")]
    pub summary_length: usize,

    /// Maximum generated title length in characters.
    #[serde(default = "default_title_length")]
    pub title_length: usize,

    /// Number of tags per item. Only one is generated today.
    #[serde(default = "default_tags_count")]
    pub tags_count: usize,

    /// Render the categorized items into a video-ready document.
    #[serde(default = "default_true")]
    pub video_format: bool,

    /// Include the narration script in the rendered document.
    #[serde(default = "default_true")]
    pub generate_script: bool,

    /// Include the storyboard in the rendered document.
    #[serde(default = "default_true")]
    pub generate_storyboard: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            summary_length: default_summary_length(),
            title_length: default_title_length(),
            tags_count: default_tags_count(),
            video_format: true,
            generate_script: true,
            generate_storyboard: true,
        }
    }
}

fn default_provider() -> String {
    "zhipu".into()
}
fn default_summary_length() -> usize {
    150
}
fn default_title_length() -> usize {
    30
}
fn default_tags_count() -> usize {
    1
}
fn default_true() -> bool {
    true
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model used for every generation call.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "ZHIPU_API_KEY".into()
}
fn default_base_url() -> String {
    "https://open.bigmodel.cn/api/paas/v4".into()
}
fn default_model() -> String {
    "glm-4-flash".into()
}
fn default_timeout_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.trendcast/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TrendcastError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.trendcast/trendcast.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TrendcastError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TrendcastError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TrendcastError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TrendcastError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TrendcastError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the provider API key from the configured env var.
pub fn validate_api_key(config: &ProviderConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(TrendcastError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("summary_length"));
        assert!(toml_str.contains("ZHIPU_API_KEY"));
        assert!(toml_str.contains("mode = \"daily\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.report.rank_threshold, 3);
        assert_eq!(parsed.enrichment.title_length, 30);
        assert_eq!(parsed.provider.model, "glm-4-flash");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[report]
mode = "incremental"

[enrichment]
enabled = true
generate_storyboard = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.report.mode, ReportMode::Incremental);
        assert!(config.enrichment.enabled);
        assert!(config.enrichment.generate_script);
        assert!(!config.enrichment.generate_storyboard);
        assert_eq!(config.enrichment.summary_length, 150);
        assert_eq!(config.provider.timeout_secs, 60);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let toml_str = "[report]\nmode = \"weekly\"\n";
        let result: std::result::Result<AppConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn api_key_validation() {
        let config = ProviderConfig {
            // Unique name so no other test or the host environment sets it.
            api_key_env: "TC_TEST_NONEXISTENT_KEY_12345".into(),
            ..Default::default()
        };
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
