mod in_memory_store;
mod local_store;

pub use in_memory_store::InMemoryResultStore;
pub use local_store::LocalResultStore;
