use crate::container::{IncludedServices, Instance};
use crate::errors::CoreError;
use crate::foundation::{Service, ServiceHandler};
use crate::providers::ServiceDescriptor;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Erased constructor for a handler type
pub type HandlerConstructor =
    Arc<dyn Fn(IncludedServices) -> Result<Instance, CoreError> + Send + Sync>;

type HandlerDescriber = Box<dyn Fn() -> Result<ServiceDescriptor, CoreError> + Send + Sync>;

struct HandlerEntry {
    type_name: &'static str,
    construct: HandlerConstructor,
    describe: HandlerDescriber,
}

/// Table of constructible service types, keyed by handler identifier.
///
/// Only types implementing [`Service`] can be added, so a handler found here
/// always satisfies the service contract.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerEntry>,
    ids_by_type: HashMap<TypeId, String>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its Rust type name
    pub fn register<T: ServiceHandler>(&mut self) -> &mut Self {
        self.register_as::<T>(std::any::type_name::<T>())
    }

    /// Register `T` under an explicit identifier
    pub fn register_as<T: ServiceHandler>(&mut self, id: impl Into<String>) -> &mut Self {
        self.register_with(id, T::create)
    }

    /// Register a constructor closure producing `T`
    pub fn register_with<T, F>(&mut self, id: impl Into<String>, constructor: F) -> &mut Self
    where
        T: Service,
        F: Fn(IncludedServices) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        let id = id.into();
        let constructor = Arc::new(constructor);

        let construct: HandlerConstructor = {
            let constructor = Arc::clone(&constructor);
            let id = id.clone();
            Arc::new(move |included: IncludedServices| {
                constructor(included)
                    .map(|service| Arc::new(service) as Instance)
                    .map_err(|e| CoreError::initialization_failed(id.clone(), e))
            })
        };

        let describe: HandlerDescriber = {
            let id = id.clone();
            Box::new(move || {
                constructor(IncludedServices::new())
                    .map(|prototype| ServiceDescriptor::from_service(&prototype, id.clone()))
                    .map_err(|e| CoreError::initialization_failed(id.clone(), e))
            })
        };

        tracing::debug!(handler = %id, type_name = std::any::type_name::<T>(), "Registered service handler");

        self.ids_by_type.insert(TypeId::of::<T>(), id.clone());
        self.handlers.insert(
            id,
            HandlerEntry {
                type_name: std::any::type_name::<T>(),
                construct,
                describe,
            },
        );
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Identifier `T` was last registered under
    pub fn id_of<T: 'static>(&self) -> Option<&str> {
        self.ids_by_type.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// Rust type name behind a handler identifier
    pub fn type_name(&self, id: &str) -> Option<&'static str> {
        self.handlers.get(id).map(|entry| entry.type_name)
    }

    pub fn constructor(&self, id: &str) -> Option<HandlerConstructor> {
        self.handlers.get(id).map(|entry| Arc::clone(&entry.construct))
    }

    /// Build a prototype with no included services and describe it
    pub fn describe(&self, id: &str) -> Option<Result<ServiceDescriptor, CoreError>> {
        self.handlers.get(id).map(|entry| (entry.describe)())
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.ids())
            .finish()
    }
}
