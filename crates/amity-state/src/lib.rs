//! Amity State - Persistence for accounts and friend requests
//!
//! This crate provides the storage backends behind
//! [`amity_core::FriendshipService`].
//!
//! ## Components
//!
//! - **storage**: SQLite persistence with sqlx
//! - **memory**: Lock-guarded in-memory backend for tests and ephemeral nodes
//! - **error**: State-specific error types
//!
//! ## Example
//!
//! ```ignore
//! use amity_core::FriendshipService;
//! use amity_state::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("amity.db", 5).await?);
//!     let friendships = FriendshipService::new(store);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod storage;

// Re-exports for convenience
pub use error::{Result, StateError};
pub use memory::MemoryStore;
pub use storage::SqliteStore;

use std::sync::Arc;

use amity_core::{StorageBackend, StorageConfig, Store};
use tracing::info;

/// Open the backend selected by `config`
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Sqlite => {
            info!(path = %config.database.display(), "Opening SQLite store");
            let store = SqliteStore::open(&config.database, config.max_connections).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
