//! Named service provider registry.
//!
//! Service names map to providers persisted in a configuration file. The
//! [`ServiceContainer`] binds providers lazily, binding their included
//! services first, and memoizes every instance it builds.
//!
//! ```no_run
//! use wirebox_core::{
//!     CoreError, IncludedServices, ProviderDetails, Service, ServiceContainer, ServiceHandler,
//!     FileProviderStore,
//! };
//!
//! struct Mailer;
//!
//! impl Service for Mailer {
//!     fn service_name(&self) -> &str {
//!         "mailer"
//!     }
//! }
//!
//! impl ServiceHandler for Mailer {
//!     fn create(_included: IncludedServices) -> Result<Self, CoreError> {
//!         Ok(Mailer)
//!     }
//! }
//!
//! # fn main() -> Result<(), CoreError> {
//! let mut services = ServiceContainer::new(FileProviderStore::new("config/service-providers.json"));
//! services.handlers_mut().register_as::<Mailer>("Mailer");
//! services.register(ProviderDetails::new("mailer", "Mailer"))?;
//!
//! let mailer = services.get_as::<Mailer>("mailer")?;
//! assert!(mailer.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod errors;
pub mod foundation;
pub mod logging;
pub mod providers;

pub use config::{
    ConfigError, ConfigFormat, FileProviderStore, MemoryProviderStore, ProviderStore,
    RegistryConfig,
};
pub use container::{BindingState, Container, IncludedServices, Instance};
pub use errors::CoreError;
pub use foundation::{Service, ServiceHandler};
pub use logging::{init_logging, LoggingConfig};
pub use providers::{
    HandlerRegistry, ProviderDetails, ProviderMap, ServiceContainer, ServiceDescriptor,
    ServiceInfo,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
