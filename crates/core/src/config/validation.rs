use std::path::Path;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Validates identifiers used as registry keys (service names, handler ids)
pub struct IdentifierValidator {
    pub field: &'static str,
}

impl IdentifierValidator {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl ConfigValidator<str> for IdentifierValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::missing_required(
                self.field,
                format!("'{}' must be a non-empty string", self.field),
            ));
        }

        if value.trim() != value {
            return Err(ConfigError::invalid_value(
                self.field,
                value,
                "identifier without leading or trailing whitespace",
            ));
        }

        Ok(())
    }
}

/// Validates the location of the persisted provider file
pub struct ProvidersPathValidator;

impl ConfigValidator<Path> for ProvidersPathValidator {
    fn validate(&self, value: &Path) -> Result<(), ConfigError> {
        if value.as_os_str().is_empty() {
            return Err(ConfigError::missing_required(
                "providers_path",
                "set a file path for the persisted service providers",
            ));
        }

        if value.is_dir() {
            return Err(ConfigError::invalid_value(
                "providers_path",
                value.display().to_string(),
                "a file path, not a directory",
            ));
        }

        Ok(())
    }
}
