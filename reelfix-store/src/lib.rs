//! Document-store access for stored media records.
//!
//! The [`RecordStore`] trait is what the reconciliation driver talks to.
//! [`MemoryStore`] backs tests; [`SqliteStore`] keeps one JSON document per
//! record in SQLite (via rusqlite with the bundled feature).

pub mod error;
pub mod memory;
pub mod operations;
pub mod patch;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use patch::{EpisodePatch, Field, FieldValue, RecordPatch};
pub use queries::{ShardStats, StoreStats};
pub use schema::{SchemaError, open_database, open_memory};
pub use sqlite::SqliteStore;
pub use store::{RecordStore, UpdateAck};
