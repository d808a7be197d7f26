use crate::config::{ConfigValidator, IdentifierValidator};
use crate::errors::CoreError;
use crate::foundation::Service;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted provider mapping, keyed by service name
pub type ProviderMap = BTreeMap<String, ServiceDescriptor>;

/// Everything the registry persists about one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service name, the registry key
    pub name: String,
    /// Identifier of the constructible type, resolved through the handler table
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Included services, bound in declaration order before this one
    #[serde(default, alias = "includes", skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            title: None,
            description: None,
            include: Vec::new(),
        }
    }

    /// Build a descriptor from a service's own accessors
    pub fn from_service<S: Service + ?Sized>(service: &S, handler: impl Into<String>) -> Self {
        Self {
            name: service.service_name().to_string(),
            handler: handler.into(),
            title: service.service_title().map(str::to_string),
            description: service.service_description().map(str::to_string),
            include: service.include_services(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_includes(&self) -> bool {
        !self.include.is_empty()
    }

    /// Check the required fields
    pub fn validate(&self) -> Result<(), CoreError> {
        IdentifierValidator::new("name")
            .validate(self.name.as_str())
            .map_err(|e| CoreError::validation(e.to_string()))?;
        IdentifierValidator::new("handler")
            .validate(self.handler.as_str())
            .map_err(|e| CoreError::validation(e.to_string()))?;

        if let Some(include) = self.include.iter().find(|i| i.trim().is_empty()) {
            return Err(CoreError::invalid_descriptor(format!(
                "service '{}' declares an empty include name '{}'",
                self.name, include
            )));
        }

        Ok(())
    }
}

/// Raw registration payload.
///
/// Every field is optional so that payloads from config files or JSON
/// documents can be checked and rejected with a proper validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "includes")]
    pub include: Option<Vec<String>>,
}

impl ProviderDetails {
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            handler: Some(handler.into()),
            ..Self::default()
        }
    }

    /// Parse a payload from an arbitrary JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::validation(format!(
                "provider details must be an object, got {}",
                value
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(include.into_iter().map(Into::into).collect());
        self
    }

    /// Normalize into a descriptor; `name` and `handler` are required
    pub fn into_descriptor(self) -> Result<ServiceDescriptor, CoreError> {
        let name = self
            .name
            .ok_or_else(|| CoreError::validation("service details are missing a 'name'"))?;
        let handler = self.handler.ok_or_else(|| {
            CoreError::validation(format!("service '{}' is missing a 'handler'", name))
        })?;

        let descriptor = ServiceDescriptor {
            name,
            handler,
            title: self.title,
            description: self.description,
            include: self.include.unwrap_or_default(),
        };
        descriptor.validate()?;

        Ok(descriptor)
    }
}

impl From<ServiceDescriptor> for ProviderDetails {
    fn from(descriptor: ServiceDescriptor) -> Self {
        Self {
            name: Some(descriptor.name),
            handler: Some(descriptor.handler),
            title: descriptor.title,
            description: descriptor.description,
            include: Some(descriptor.include),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ServiceInfo;
    use serde_json::json;

    #[test]
    fn test_descriptor_from_service() {
        let info = ServiceInfo::new("mailer")
            .with_title("Mailer")
            .with_include(["queue"]);

        let descriptor = ServiceDescriptor::from_service(&info, "SmtpMailer");

        assert_eq!(descriptor.name, "mailer");
        assert_eq!(descriptor.handler, "SmtpMailer");
        assert_eq!(descriptor.title.as_deref(), Some("Mailer"));
        assert_eq!(descriptor.description, None);
        assert_eq!(descriptor.include, vec!["queue"]);
    }

    #[test]
    fn test_details_defaults() {
        let descriptor = ProviderDetails::new("cache", "MemoryCache")
            .into_descriptor()
            .unwrap();

        assert_eq!(descriptor, ServiceDescriptor::new("cache", "MemoryCache"));
        assert!(!descriptor.has_includes());
    }

    #[test]
    fn test_details_require_name_and_handler() {
        let missing_name = ProviderDetails {
            handler: Some("MemoryCache".to_string()),
            ..ProviderDetails::default()
        };
        assert!(missing_name.into_descriptor().unwrap_err().is_validation());

        let missing_handler = ProviderDetails {
            name: Some("cache".to_string()),
            ..ProviderDetails::default()
        };
        assert!(missing_handler.into_descriptor().unwrap_err().is_validation());

        let empty_name = ProviderDetails::new("", "MemoryCache");
        assert!(empty_name.into_descriptor().unwrap_err().is_validation());
    }

    #[test]
    fn test_details_from_value() {
        let details = ProviderDetails::from_value(json!({
            "name": "mailer",
            "handler": "SmtpMailer",
            "includes": ["queue"],
        }))
        .unwrap();

        let descriptor = details.into_descriptor().unwrap();
        assert_eq!(descriptor.include, vec!["queue"]);

        assert!(ProviderDetails::from_value(json!("SmtpMailer"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_empty_include_is_rejected() {
        let details = ProviderDetails::new("mailer", "SmtpMailer").with_include(["queue", ""]);
        assert!(matches!(
            details.into_descriptor(),
            Err(CoreError::InvalidServiceDescriptor { .. })
        ));
    }

    #[test]
    fn test_descriptor_serialization_skips_empty_fields() {
        let descriptor = ServiceDescriptor::new("cache", "MemoryCache");
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value, json!({ "name": "cache", "handler": "MemoryCache" }));
    }
}
