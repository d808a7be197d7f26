use crate::config::ConfigError;
use thiserror::Error;

/// Core error type for the service registry
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid service descriptor: {message}")]
    InvalidServiceDescriptor { message: String },

    #[error("Handler '{handler}' is not a registered service type (required by '{service}')")]
    UnknownHandler { service: String, handler: String },

    #[error("Service '{service}' resolved to an instance of a different type (expected {expected})")]
    TypeMismatch { service: String, expected: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Circular dependency detected: {path} (cycle at: {cycle_service})")]
    CircularDependency { path: String, cycle_service: String },

    #[error("Service initialization failed for '{service_type}': {source}")]
    ServiceInitializationFailed {
        service_type: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CoreError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new invalid descriptor error
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidServiceDescriptor {
            message: message.into(),
        }
    }

    /// Wrap a constructor failure for the given handler
    pub fn initialization_failed(
        service_type: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ServiceInitializationFailed {
            service_type: service_type.into(),
            source: source.into(),
        }
    }

    /// Check if the error rejected a registration payload
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidServiceDescriptor { .. }
        )
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the error came from the include graph
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::Yaml(e) => Self::Yaml(e),
            ConfigError::Json(e) => Self::Json(e),
            other => Self::configuration(other.to_string()),
        }
    }
}
