//! In-process adapters that keep all state in memory.

mod in_memory_lending_store;

pub use in_memory_lending_store::InMemoryLendingStore;
