//! Configuration settings for the logistics insight system.

use crate::error::{ConfigError, Result};
use crate::query::{DataBounds, TimeRange};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub history: HistoryConfig,
    pub festival: FestivalConfig,
    pub narrative: NarrativeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("logistics-insight.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("logistics-insight/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.data.earliest > self.data.latest {
            return Err(ConfigError::Invalid(
                "data.earliest must not be after data.latest".to_string(),
            )
            .into());
        }

        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history.capacity must be > 0".to_string()).into());
        }

        if self.festival.start > self.festival.end {
            return Err(ConfigError::Invalid(
                "festival.start must not be after festival.end".to_string(),
            )
            .into());
        }

        if self.narrative.provider.is_http() {
            if self.narrative.base_url().is_empty() {
                return Err(ConfigError::MissingField("narrative.base_url".to_string()).into());
            }
            if self.narrative.model().is_empty() {
                return Err(ConfigError::MissingField("narrative.model".to_string()).into());
            }
        }

        if self.narrative.timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("narrative.timeout_secs must be > 0".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.narrative.temperature) {
            return Err(ConfigError::Invalid(
                "narrative.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// Extent of the loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

impl Default for DataConfig {
    fn default() -> Self {
        let bounds = DataBounds::default();
        Self {
            earliest: bounds.earliest,
            latest: bounds.latest,
        }
    }
}

impl DataConfig {
    pub fn bounds(&self) -> DataBounds {
        DataBounds::new(self.earliest, self.latest)
    }
}

/// Query history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of records kept; older ones are evicted first
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// The fixed window analysed by festival-period queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FestivalConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for FestivalConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 10, 25).unwrap_or_default(),
        }
    }
}

impl FestivalConfig {
    /// Midnight on `start` through midnight on `end`.
    pub fn period(&self) -> TimeRange {
        TimeRange::new(
            self.start.and_time(NaiveTime::MIN),
            self.end.and_time(NaiveTime::MIN),
        )
    }
}

/// Narrative rewriting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Rewrite analysis output before returning it
    pub enabled: bool,
    /// Provider type: "rule_based", "openai" or "ollama"
    pub provider: NarrativeProvider,
    /// API base URL; defaults per provider when unset
    pub base_url: Option<String>,
    /// Model name; defaults per provider when unset
    pub model: Option<String>,
    /// API key (only needed by hosted providers)
    pub api_key: Option<String>,
    /// Upper bound on a single rewrite, in seconds
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: NarrativeProvider::RuleBased,
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: 30,
            max_tokens: 800,
            temperature: 0.3,
        }
    }
}

impl NarrativeConfig {
    /// Configured base URL, or the provider's default.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Configured model, or the provider's default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Narrative provider enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeProvider {
    RuleBased,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl NarrativeProvider {
    /// Whether the provider is reached over HTTP.
    pub fn is_http(&self) -> bool {
        !matches!(self, Self::RuleBased)
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::RuleBased => "",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::RuleBased => "",
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Ollama => "llama2",
        }
    }
}
