#[allow(clippy::module_inception)]
pub mod container;
pub mod included;

use std::any::Any;
use std::sync::Arc;

/// Type-erased service instance
pub type Instance = Arc<dyn Any + Send + Sync>;

pub use container::{BindingState, Container, ServiceEntry, ServiceFactory};
pub use included::IncludedServices;
