//! # Dakuaz Store
//!
//! Expiring key-value backends for revocation and rotation records.
//! Provides a trait-based interface with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The engine talks to storage only through [`KeyValueStore`], so a backend
//! is an explicitly constructed value handed to it, never a global handle.
//! [`SqliteStore`] persists to disk; [`MemoryStore`] is for tests and can
//! simulate an unavailable or slow backend.
//!
//! ## Key Types
//!
//! - [`KeyValueStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`SwapRequest`] / [`SwapOutcome`] - Atomic compare-and-swap
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dakuaz_store::{KeyValueStore, SqliteStore, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("dakuaz.db").unwrap();
//!
//!     // A record that disappears after the given Unix second
//!     store.set_until("key", "value", 1_900_000_000).await.unwrap();
//!     let value = store.get("key", 1_800_000_000).await.unwrap();
//!     assert_eq!(value.as_deref(), Some("value"));
//!
//!     // Past the deadline the record reads as absent and is deleted
//!     assert!(!store.contains("key", 2_000_000_000).await.unwrap());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, StoreExt, SwapOutcome, SwapRequest};
