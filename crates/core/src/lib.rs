//! Core types and shared functionality for tab-bear.
//!
//! This crate provides:
//! - The session state machine and the serialized cache writer
//! - Metadata and bulk stores (SQLite and in-memory)
//! - The session serializer and export helpers
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod export;
pub mod index;
pub mod message;
pub mod model;
pub mod queue;
pub mod serialize;
pub mod session;
pub mod store;
pub mod writer;

pub use config::AppConfig;
pub use error::Error;
pub use export::SessionExport;
pub use message::{Message, MessageOutcome};
pub use model::{CacheEntry, SessionState};
pub use session::{CacheLimits, SessionCache};
pub use writer::{AppendOutcome, RejectReason};
