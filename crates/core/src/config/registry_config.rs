use crate::config::{ConfigError, ConfigValidator, ProvidersPathValidator};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default location of the persisted provider file, relative to the process
/// working directory. Only used when nothing else is configured.
pub const DEFAULT_PROVIDERS_FILE: &str = "config/service-providers.json";

pub const PROVIDERS_FILE_ENV: &str = "WIREBOX_PROVIDERS_FILE";
pub const PROVIDERS_FORMAT_ENV: &str = "WIREBOX_PROVIDERS_FORMAT";
pub const PROVIDERS_PRETTY_ENV: &str = "WIREBOX_PROVIDERS_PRETTY";

/// Serialization format of the persisted provider file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Guess the format from a file extension, `None` when unknown
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        match extension.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::invalid_value("format", s, "json or yaml")),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let format_str = match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
        };
        write!(f, "{}", format_str)
    }
}

/// Settings for the file-backed provider store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Where the provider mapping is persisted
    pub providers_path: PathBuf,
    /// Explicit format; inferred from the file extension when `None`
    pub format: Option<ConfigFormat>,
    /// Write human-readable output
    pub pretty: bool,
}

impl RegistryConfig {
    pub fn new(providers_path: impl Into<PathBuf>) -> Self {
        Self {
            providers_path: providers_path.into(),
            format: None,
            pretty: true,
        }
    }

    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Format used for reading and writing, falling back to JSON
    pub fn resolved_format(&self) -> ConfigFormat {
        self.format
            .or_else(|| ConfigFormat::from_path(&self.providers_path))
            .unwrap_or(ConfigFormat::Json)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = env::var(PROVIDERS_FILE_ENV) {
            config.providers_path = PathBuf::from(path);
        }

        if let Ok(format_str) = env::var(PROVIDERS_FORMAT_ENV) {
            config.format = Some(format_str.parse()?);
        }

        if let Ok(pretty_str) = env::var(PROVIDERS_PRETTY_ENV) {
            config.pretty = parse_flag(&pretty_str).ok_or_else(|| {
                ConfigError::invalid_value("pretty", pretty_str.clone(), "true or false")
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        ProvidersPathValidator.validate(&self.providers_path)?;

        if let (Some(explicit), Some(inferred)) =
            (self.format, ConfigFormat::from_path(&self.providers_path))
        {
            if explicit != inferred {
                return Err(ConfigError::invalid_value(
                    "format",
                    explicit.to_string(),
                    format!(
                        "{} to match the extension of {}",
                        inferred,
                        self.providers_path.display()
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDERS_FILE)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
