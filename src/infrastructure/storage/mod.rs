pub mod mappers;
pub mod memory_interaction_store;
pub mod rows;
pub mod sqlite_interaction_store;

pub use memory_interaction_store::MemoryInteractionStore;
pub use sqlite_interaction_store::SqliteInteractionStore;
