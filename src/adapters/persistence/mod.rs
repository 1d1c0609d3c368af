//! Meeting store adapters: in-memory/JSON dataset and SQLite.

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::{Dataset, MemoryStore};
pub use sqlite_store::SqliteStore;
