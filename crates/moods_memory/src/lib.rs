pub mod in_memory;
pub mod layout;
pub mod session;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use session::{ReflectionSession, SaveOutcome};
pub use sqlite::SqliteStore;
