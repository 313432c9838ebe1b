pub mod in_memory_store;
pub mod notifier;
pub mod observability;

pub use in_memory_store::{InMemoryEntityStore, StoreSnapshot};
pub use notifier::LogNotifier;
pub use observability::*;
