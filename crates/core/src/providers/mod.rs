pub mod descriptor;
pub mod handlers;
pub mod provider;
pub mod registry;

pub use descriptor::*;
pub use handlers::*;
pub use provider::*;
pub use registry::*;
