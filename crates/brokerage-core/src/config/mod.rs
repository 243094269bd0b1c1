pub mod router;
pub mod store;

pub use router::RouterConfig;
pub use store::{StoreConfig, SynchronousMode};
