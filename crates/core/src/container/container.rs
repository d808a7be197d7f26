use crate::container::{IncludedServices, Instance};
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::Arc;

/// Deferred factory installed for a service name
pub type ServiceFactory = Box<dyn Fn() -> Result<Instance, CoreError> + Send + Sync>;

/// Service entry in the container
pub enum ServiceEntry {
    /// Factory installed, not yet invoked
    Deferred(ServiceFactory),
    /// Memoized instance
    Instance(Instance),
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceEntry::Deferred(_) => f.debug_tuple("Deferred").field(&"<factory>").finish(),
            ServiceEntry::Instance(_) => f.debug_tuple("Instance").field(&"<instance>").finish(),
        }
    }
}

/// Lifecycle of a service name. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    /// Included services are being bound
    Binding,
    /// Factory installed
    Bound,
    /// Factory invoked and its result cached
    Instantiated,
}

/// Name-indexed store of deferred factories and memoized instances
#[derive(Debug, Default)]
pub struct Container {
    entries: HashMap<String, ServiceEntry>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a binding exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Install a deferred factory.
    ///
    /// Returns `false` and leaves the entry untouched when `name` already
    /// holds an instance; instantiated services are never rebound.
    pub fn bind<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Result<Instance, CoreError> + Send + Sync + 'static,
    {
        let name = name.into();
        if matches!(self.entries.get(&name), Some(ServiceEntry::Instance(_))) {
            return false;
        }
        self.entries
            .insert(name, ServiceEntry::Deferred(Box::new(factory)));
        true
    }

    /// Store a ready-made instance, same rule as `bind`
    pub fn instance(&mut self, name: impl Into<String>, instance: Instance) -> bool {
        let name = name.into();
        if matches!(self.entries.get(&name), Some(ServiceEntry::Instance(_))) {
            return false;
        }
        self.entries.insert(name, ServiceEntry::Instance(instance));
        true
    }

    /// Get the instance for `name`, invoking its factory on first call.
    ///
    /// A failing factory stays installed so a later call can retry.
    pub fn resolve(&mut self, name: &str) -> Result<Option<Instance>, CoreError> {
        let instance = match self.entries.get(name) {
            None => return Ok(None),
            Some(ServiceEntry::Instance(instance)) => return Ok(Some(Arc::clone(instance))),
            Some(ServiceEntry::Deferred(factory)) => factory()?,
        };

        tracing::debug!(service = name, "Instantiated service");
        self.entries.insert(
            name.to_string(),
            ServiceEntry::Instance(Arc::clone(&instance)),
        );
        Ok(Some(instance))
    }

    /// Resolve every bound name in `names` into a snapshot, skipping unbound ones
    pub fn snapshot(&mut self, names: &[String]) -> Result<IncludedServices, CoreError> {
        let mut included = IncludedServices::new();
        for name in names {
            if let Some(instance) = self.resolve(name)? {
                included.insert(name.clone(), instance);
            }
        }
        Ok(included)
    }

    pub fn state(&self, name: &str) -> BindingState {
        match self.entries.get(name) {
            None => BindingState::Unbound,
            Some(ServiceEntry::Deferred(_)) => BindingState::Bound,
            Some(ServiceEntry::Instance(_)) => BindingState::Instantiated,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_resolve_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut container = Container::new();
        assert!(container.bind("counter", move || {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(id) as Instance)
        }));

        assert_eq!(container.state("counter"), BindingState::Bound);

        let first = container.resolve("counter").unwrap().unwrap();
        let second = container.resolve("counter").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(container.state("counter"), BindingState::Instantiated);
    }

    #[test]
    fn test_instantiated_entries_are_not_rebound() {
        let mut container = Container::new();
        container.instance("value", Arc::new(1u32) as Instance);

        assert!(!container.bind("value", || Ok(Arc::new(2u32) as Instance)));
        assert!(!container.instance("value", Arc::new(3u32) as Instance));

        let value = container.resolve("value").unwrap().unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 1);
    }

    #[test]
    fn test_deferred_entries_can_be_replaced() {
        let mut container = Container::new();
        container.bind("value", || Ok(Arc::new(1u32) as Instance));
        assert!(container.bind("value", || Ok(Arc::new(2u32) as Instance)));

        let value = container.resolve("value").unwrap().unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 2);
    }

    #[test]
    fn test_failed_factory_can_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let mut container = Container::new();
        container.bind("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CoreError::validation("first attempt fails"))
            } else {
                Ok(Arc::new("ok") as Instance)
            }
        });

        assert!(container.resolve("flaky").is_err());
        assert_eq!(container.state("flaky"), BindingState::Bound);
        assert!(container.resolve("flaky").unwrap().is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_name() {
        let mut container = Container::new();
        assert!(!container.contains("missing"));
        assert!(container.resolve("missing").unwrap().is_none());
        assert_eq!(container.state("missing"), BindingState::Unbound);
    }

    #[test]
    fn test_snapshot_skips_unbound_names() {
        let mut container = Container::new();
        container.bind("a", || Ok(Arc::new(1u8) as Instance));
        container.instance("b", Arc::new(2u8) as Instance);

        let names = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let snapshot = container.snapshot(&names).unwrap();

        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(container.state("a"), BindingState::Instantiated);
        assert_eq!(container.names(), vec!["a", "b"]);
    }
}
