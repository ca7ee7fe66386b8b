//! Core types and shared functionality for precache.
//!
//! This crate provides:
//! - Cache generation storage with SQLite and in-memory backends
//! - The generation lifecycle state machine
//! - Request/response descriptors
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod message;

pub use cache::{CacheDb, CacheStorage, MemoryStorage};
pub use config::{AppConfig, DynamicPolicy};
pub use error::Error;
pub use generation::{Generation, GenerationState};
pub use message::{Request, Response};
