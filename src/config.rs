use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::engine::DraftVersion;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Names of the configuration files looked up, in order, in each location
const CONFIG_NAMES: [&str; 4] = [
    "validate-json.toml",
    "validate-json.json",
    ".validate-json.toml",
    ".validate-json.json",
];

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "VALIDATE_JSON_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

/// Schema engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Draft assumed for documents without `$schema`
    pub default_draft: DraftVersion,
    /// Whether `format` asserts; unset leaves it to the draft
    pub validate_formats: Option<bool>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Rendering of reports on standard output
    pub format: ReportFormat,
    /// Colouring of the report status
    pub color: ColorChoice,
}

/// How reports are written to standard output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `<file>: <report>` text blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Colour when standard output is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => atty::is(atty::Stream::Stdout),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!("unknown color choice: {}", other)),
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment
    pub async fn load_config() -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider).await
    }

    /// Load configuration reading the environment through `env`
    pub async fn load_config_with(env: &impl EnvProvider) -> Result<Config> {
        let mut config = Config::default();

        if let Some(path) = env.get(CONFIG_PATH_ENV) {
            config = Self::load_from_file(Path::new(&path)).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        Self::apply_environment_overrides_with(env, config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        debug!(path = %path.display(), "loading configuration");
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in the current directory, then in the user
    /// configuration directory
    pub async fn find_config_file() -> Result<Option<Config>> {
        let mut locations = vec![PathBuf::new()];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("validate-json"));
        }

        for location in &locations {
            for name in &CONFIG_NAMES {
                let path = location.join(name);
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(draft) = env.get("VALIDATE_JSON_DRAFT") {
            config.engine.default_draft = parse_env("VALIDATE_JSON_DRAFT", &draft)?;
        }

        if let Some(validate_formats) = env.get("VALIDATE_JSON_VALIDATE_FORMATS") {
            config.engine.validate_formats = Some(parse_env(
                "VALIDATE_JSON_VALIDATE_FORMATS",
                &validate_formats,
            )?);
        }

        if let Some(format) = env.get("VALIDATE_JSON_FORMAT") {
            config.output.format = parse_env("VALIDATE_JSON_FORMAT", &format)?;
        }

        if let Some(color) = env.get("VALIDATE_JSON_COLOR") {
            config.output.color = parse_env("VALIDATE_JSON_COLOR", &color)?;
        }

        Ok(config)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}
