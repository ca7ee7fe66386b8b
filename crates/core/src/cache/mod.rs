//! Persistent store of cache generations.
//!
//! A generation is a named set of request/response pairs. The store is an
//! injected dependency behind the [`CacheStorage`] trait:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, automatic migrations
//! - [`MemoryStorage`]: process-local maps, for tests and ephemeral hosts
//!
//! Entries are addressed by a SHA-256 key over method and URL.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStorage;
pub use storage::CacheStorage;
