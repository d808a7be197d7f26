pub mod registry_config;
pub mod store;
pub mod validation;

pub use registry_config::*;
pub use store::*;
pub use validation::*;
