use crate::container::Instance;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Snapshot of included service instances handed to a handler constructor.
///
/// Keeps the declaration order of the provider's `include` list.
#[derive(Clone, Default)]
pub struct IncludedServices {
    services: Vec<(String, Instance)>,
}

impl IncludedServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance, replacing an earlier one with the same name
    pub fn insert(&mut self, name: impl Into<String>, instance: Instance) {
        let name = name.into();
        match self.services.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = instance,
            None => self.services.push((name, instance)),
        }
    }

    /// Type-erased access
    pub fn get_any(&self, name: &str) -> Option<&Instance> {
        self.services
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| instance)
    }

    /// Typed access; `None` if missing or of another type
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get_any(name)
            .and_then(|instance| Arc::clone(instance).downcast::<T>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_any(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.services.iter().map(|(n, i)| (n.as_str(), i))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for IncludedServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
