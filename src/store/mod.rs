//! Persistence layer — conversation and user state behind an etag-checked
//! key-value trait.

pub mod accessor;
pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use accessor::{StateScope, conversation_key, user_key};
pub use libsql_backend::LibSqlStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StoreItem};
