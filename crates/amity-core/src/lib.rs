//! Amity Core - Domain types and the friend relationship state machine
//!
//! This crate holds everything about friendships that does not depend on a
//! particular database or transport.
//!
//! # Modules
//!
//! - [`identity`] - User identifiers and account records
//! - [`friendship`] - Friend request edges and the state machine deciding actions on them
//! - [`view`] - Friend and pending sets derived from edges
//! - [`service`] - Runs actions against a store
//! - [`config`] - Node configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust
//! use amity_core::{decide_request, Transition, UserId};
//!
//! let transition = decide_request(UserId(1), UserId(2), None).unwrap();
//! assert_eq!(transition, Transition::Create { sender: UserId(1), receiver: UserId(2) });
//! ```

pub mod config;
pub mod error;
pub mod friendship;
pub mod identity;
pub mod service;
pub mod view;

// Re-exports for convenience
pub use error::{AmityError, ConflictReason, FieldErrors, Response, Result};

pub use friendship::{
    decide_accept, decide_reject, decide_request, FriendEdge, FriendRequestId, PairKey,
    PairState, Transition,
};
pub use identity::{fold_case, normalize_email, search_terms, NewUser, User, UserId};
pub use service::FriendshipService;
pub use view::FriendshipView;

pub use config::{
    AuthConfig, NodeConfig, SearchConfig, ServerConfig, StorageBackend, StorageConfig,
    ThrottleConfig,
};

use async_trait::async_trait;

/// Outcome of an atomic check-and-create on a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The pair was vacant and this edge now occupies it
    Created(FriendEdge),
    /// Another edge already occupies the pair
    Occupied(FriendEdge),
}

/// Trait for account persistence
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create an account; a taken email yields `Conflict(EmailTaken)`
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Retrieve an account by id
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Retrieve an account by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check whether an email is registered, ignoring case
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Retrieve several accounts, ordered by id; unknown ids are skipped
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Accounts matching every term on some searchable field, ordered by id
    async fn search_users(&self, terms: &[String], limit: u32) -> Result<Vec<User>>;
}

/// Trait for friend request persistence
///
/// Implementations must keep at most one edge per unordered pair, even under
/// concurrent inserts.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// The edge occupying the pair `{a, b}`, in either direction
    async fn edge_between(&self, a: UserId, b: UserId) -> Result<Option<FriendEdge>>;

    /// Retrieve an edge by id
    async fn get_edge(&self, id: FriendRequestId) -> Result<Option<FriendEdge>>;

    /// Insert a pending edge unless the pair is already occupied
    async fn insert_edge(&self, sender: UserId, receiver: UserId) -> Result<Insertion>;

    /// Flip a pending edge to accepted; false if it was not pending
    async fn mark_accepted(&self, id: FriendRequestId) -> Result<bool>;

    /// Delete a pending edge; false if it was not pending
    async fn delete_pending(&self, id: FriendRequestId) -> Result<bool>;

    /// Peers connected to `user` by accepted edges
    async fn list_friend_ids(&self, user: UserId) -> Result<Vec<UserId>>;

    /// Pending edges addressed to `user`, oldest first
    async fn list_pending_received(&self, user: UserId) -> Result<Vec<FriendEdge>>;
}

/// A backend holding both accounts and friend requests
pub trait Store: IdentityStore + RelationshipStore {}

impl<T: IdentityStore + RelationshipStore + ?Sized> Store for T {}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
