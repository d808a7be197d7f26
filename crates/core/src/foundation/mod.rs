pub mod traits;

pub use traits::{Service, ServiceHandler};
