use crate::foundation::Service;

/// Base service value object.
///
/// Concrete handlers usually embed a `ServiceInfo` and forward the `Service`
/// accessors to it, or use it directly when a service carries no behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    name: String,
    title: Option<String>,
    description: Option<String>,
    include: Vec<String>,
}

impl ServiceInfo {
    /// Create a new service description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set service title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set service description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set included services
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn set_include(&mut self, include: Vec<String>) {
        self.include = include;
    }
}

impl Service for ServiceInfo {
    fn service_name(&self) -> &str {
        &self.name
    }

    fn service_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn service_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn include_services(&self) -> Vec<String> {
        self.include.clone()
    }
}
