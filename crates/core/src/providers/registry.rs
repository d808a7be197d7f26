use crate::config::{FileProviderStore, ProviderStore, RegistryConfig};
use crate::container::{BindingState, Container, Instance};
use crate::errors::CoreError;
use crate::foundation::Service;
use crate::providers::{HandlerRegistry, ProviderDetails, ProviderMap, ServiceDescriptor};
use std::any::Any;
use std::sync::Arc;

/// Service container backed by a persisted provider registry.
///
/// The registry maps service names to [`ServiceDescriptor`]s and writes every
/// change through to its [`ProviderStore`]. Instances are bound lazily: the
/// first `get` for a name binds its included services, installs a deferred
/// factory and memoizes the result for the lifetime of the container.
///
/// Writes to the store are plain read-modify-write cycles with no locking;
/// two processes registering at the same time can overwrite each other.
pub struct ServiceContainer {
    container: Container,
    handlers: HandlerRegistry,
    store: Box<dyn ProviderStore>,
    providers: Option<ProviderMap>,
    binding: Vec<String>,
}

impl ServiceContainer {
    /// Create a container persisting its providers to `store`
    pub fn new<S: ProviderStore + 'static>(store: S) -> Self {
        Self {
            container: Container::new(),
            handlers: HandlerRegistry::new(),
            store: Box::new(store),
            providers: None,
            binding: Vec::new(),
        }
    }

    /// Create a container using a file store described by `config`
    pub fn from_config(config: &RegistryConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::new(FileProviderStore::from_config(config)))
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn store_location(&self) -> String {
        self.store.location()
    }

    /// Load the provider mapping from the store.
    ///
    /// Only the first call reads the store unless `force_reload` is set.
    pub fn load(&mut self, force_reload: bool) -> Result<(), CoreError> {
        if self.providers.is_some() && !force_reload {
            return Ok(());
        }

        let providers = self.store.load()?.unwrap_or_default();
        if let Some((key, descriptor)) = providers.iter().find(|(key, d)| **key != d.name) {
            return Err(CoreError::configuration(format!(
                "entry '{}' in {} describes service '{}'",
                key,
                self.store.location(),
                descriptor.name
            )));
        }

        tracing::debug!(
            "Loaded {} service providers from {}",
            providers.len(),
            self.store.location()
        );
        self.providers = Some(providers);
        Ok(())
    }

    /// All registered providers
    pub fn providers(&mut self) -> Result<&ProviderMap, CoreError> {
        self.load(false)?;
        Ok(self.providers.get_or_insert_with(ProviderMap::new))
    }

    fn providers_mut(&mut self) -> Result<&mut ProviderMap, CoreError> {
        self.load(false)?;
        Ok(self.providers.get_or_insert_with(ProviderMap::new))
    }

    pub fn get_provider(&mut self, name: &str) -> Result<Option<ServiceDescriptor>, CoreError> {
        Ok(self.providers()?.get(name).cloned())
    }

    pub fn has_provider(&mut self, name: &str) -> Result<bool, CoreError> {
        Ok(self
            .providers()?
            .get(name)
            .is_some_and(|descriptor| !descriptor.handler.is_empty()))
    }

    pub fn provider_names(&mut self) -> Result<Vec<String>, CoreError> {
        Ok(self.providers()?.keys().cloned().collect())
    }

    /// Register a provider from a raw payload.
    ///
    /// Returns whether the mapping was persisted. A failed write still leaves
    /// the provider registered in memory.
    pub fn register(&mut self, details: impl Into<ProviderDetails>) -> Result<bool, CoreError> {
        let descriptor = details.into().into_descriptor()?;
        self.register_descriptor(descriptor)
    }

    /// Register a provider described by a service instance.
    ///
    /// The handler is the identifier `S` is registered under in the handler table.
    pub fn register_service<S: Service>(&mut self, service: &S) -> Result<bool, CoreError> {
        let handler = self
            .handlers
            .id_of::<S>()
            .ok_or_else(|| {
                CoreError::invalid_descriptor(format!(
                    "{} is not registered as a service handler",
                    std::any::type_name::<S>()
                ))
            })?
            .to_string();

        let descriptor = ServiceDescriptor::from_service(service, handler);
        descriptor.validate()?;
        self.register_descriptor(descriptor)
    }

    /// Register a provider by handler identifier alone.
    ///
    /// A prototype is built without included services and describes itself.
    /// Returns `Ok(false)` when the handler is unknown.
    pub fn register_handler(&mut self, handler: &str) -> Result<bool, CoreError> {
        let descriptor = match self.handlers.describe(handler) {
            Some(descriptor) => descriptor?,
            None => {
                tracing::warn!("Cannot register unknown service handler '{}'", handler);
                return Ok(false);
            }
        };

        descriptor.validate()?;
        self.register_descriptor(descriptor)
    }

    fn register_descriptor(&mut self, descriptor: ServiceDescriptor) -> Result<bool, CoreError> {
        if !self.handlers.contains(&descriptor.handler) {
            return Err(CoreError::invalid_descriptor(format!(
                "handler '{}' of service '{}' is not a registered service type",
                descriptor.handler, descriptor.name
            )));
        }

        // Pick up edits made to the store since the last load.
        self.load(true)?;

        let name = descriptor.name.clone();
        self.providers_mut()?.insert(name.clone(), descriptor);

        let persisted = self.persist();
        tracing::info!("Registered service provider '{}'", name);
        Ok(persisted)
    }

    /// Remove a provider by name, or by handler identifier.
    ///
    /// Removing something that is not registered succeeds without touching
    /// the store. Already bound instances stay available through `get`.
    pub fn unregister(&mut self, name_or_handler: &str) -> Result<bool, CoreError> {
        let name = if self.has_provider(name_or_handler)? {
            name_or_handler.to_string()
        } else {
            let found = self
                .providers()?
                .values()
                .find(|descriptor| descriptor.handler == name_or_handler)
                .map(|descriptor| descriptor.name.clone());

            match found {
                Some(name) => name,
                None => {
                    tracing::debug!(
                        "Nothing to unregister for '{}'",
                        name_or_handler
                    );
                    return Ok(true);
                }
            }
        };

        self.providers_mut()?.remove(&name);

        let persisted = self.persist();
        tracing::info!("Unregistered service provider '{}'", name);
        Ok(persisted)
    }

    fn persist(&mut self) -> bool {
        let empty = ProviderMap::new();
        let providers = self.providers.as_ref().unwrap_or(&empty);

        match self.store.save(providers) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to persist service providers to {}: {}",
                    self.store.location(),
                    e
                );
                false
            }
        }
    }

    /// Get the instance for `name`, binding and constructing it on first use.
    ///
    /// `Ok(None)` means no provider is registered under `name`.
    pub fn get(&mut self, name: &str) -> Result<Option<Instance>, CoreError> {
        if !self.container.contains(name) && !self.bind_provider(name, None)? {
            tracing::debug!("No service provider registered for '{}'", name);
            return Ok(None);
        }

        self.container.resolve(name)
    }

    /// Typed variant of [`get`](Self::get)
    pub fn get_as<T: Any + Send + Sync>(&mut self, name: &str) -> Result<Option<Arc<T>>, CoreError> {
        match self.get(name)? {
            None => Ok(None),
            Some(instance) => instance.downcast::<T>().map(Some).map_err(|_| {
                CoreError::TypeMismatch {
                    service: name.to_string(),
                    expected: std::any::type_name::<T>().to_string(),
                }
            }),
        }
    }

    /// Whether a binding exists for `name`. This does not consult the
    /// provider registry: a registered but never requested service is not bound.
    pub fn has(&self, name: &str) -> bool {
        self.container.contains(name)
    }

    pub fn binding_state(&self, name: &str) -> BindingState {
        if self.binding.iter().any(|n| n == name) {
            BindingState::Binding
        } else {
            self.container.state(name)
        }
    }

    /// Bind `name` and, first, everything it includes.
    ///
    /// Returns `Ok(false)` when no provider is registered under `name`.
    fn bind_provider(
        &mut self,
        name: &str,
        descriptor: Option<ServiceDescriptor>,
    ) -> Result<bool, CoreError> {
        let descriptor = match descriptor {
            Some(descriptor) => descriptor,
            None => match self.get_provider(name)? {
                Some(descriptor) => descriptor,
                None => return Ok(false),
            },
        };

        self.binding.push(name.to_string());
        let result = self.bind_descriptor(descriptor);
        self.binding.pop();

        result.map(|()| true)
    }

    fn bind_descriptor(&mut self, descriptor: ServiceDescriptor) -> Result<(), CoreError> {
        let constructor =
            self.handlers
                .constructor(&descriptor.handler)
                .ok_or_else(|| CoreError::UnknownHandler {
                    service: descriptor.name.clone(),
                    handler: descriptor.handler.clone(),
                })?;

        for include in &descriptor.include {
            if self.binding.iter().any(|n| n == include) {
                let mut path = self.binding.clone();
                path.push(include.clone());
                return Err(CoreError::CircularDependency {
                    path: path.join(" -> "),
                    cycle_service: include.clone(),
                });
            }

            if self.container.contains(include) {
                continue;
            }

            if !self.bind_provider(include, None)? {
                tracing::warn!(
                    "Service '{}' includes '{}' which has no provider",
                    descriptor.name,
                    include
                );
            }
        }

        let included = self.container.snapshot(&descriptor.include)?;
        tracing::debug!(
            "Binding service '{}' to handler '{}' with {} included services",
            descriptor.name,
            descriptor.handler,
            included.len()
        );

        self.container
            .bind(descriptor.name, move || constructor(included.clone()));
        Ok(())
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("store", &self.store.location())
            .field("providers", &self.providers)
            .field("handlers", &self.handlers)
            .field("container", &self.container)
            .finish()
    }
}
