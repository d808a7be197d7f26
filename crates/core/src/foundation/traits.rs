use crate::container::IncludedServices;
use crate::errors::CoreError;
use std::fmt;

/// Capability set every provider type exposes to the registry.
///
/// A `Service` only describes itself; the registry turns these accessors into
/// a persisted descriptor when the service is registered.
pub trait Service: Send + Sync + 'static {
    /// Unique name the service is registered under
    fn service_name(&self) -> &str;

    /// Human-readable title
    fn service_title(&self) -> Option<&str> {
        None
    }

    /// Longer description
    fn service_description(&self) -> Option<&str> {
        None
    }

    /// Names of other services that must be bound before this one is built.
    /// Their instances are handed to the constructor.
    fn include_services(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A `Service` the registry can construct on demand.
///
/// `create` receives a snapshot of the already-bound included services as
/// its only argument.
pub trait ServiceHandler: Service + Sized {
    fn create(included: IncludedServices) -> Result<Self, CoreError>;
}

impl fmt::Debug for dyn Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.service_name())
            .field("title", &self.service_title())
            .field("include", &self.include_services())
            .finish()
    }
}
