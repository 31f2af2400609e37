//! Public surface for the `kinship-node` crate.
//!
//! Exposes the router builder, storage backends and config types so that
//! external crates (e.g. the conformance test suite) can spin up an
//! in-process node without spawning a subprocess.

pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod relations;
pub mod router;
pub mod storage;

pub use config::NodeConfig;
pub use directory::{AccountDirectory, HttpDirectory, LocalDirectory};
pub use relations::{RelationError, RelationshipManager};
pub use router::build_router;
pub use storage::{memory::MemoryStorage, sqlite::SqliteStorage, Storage, StorageError};
