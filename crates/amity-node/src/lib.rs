//! Amity Node - HTTP backend for accounts and friend requests
//!
//! The binary in `main.rs` loads configuration, opens a store and serves
//! the router built by [`server::create_router`].

pub mod auth;
pub mod error;
pub mod server;
pub mod throttle;

use std::sync::Arc;
use std::time::Instant;

use amity_core::{FriendshipService, NodeConfig, Result, Store};

use auth::{PasswordHasher, TokenIssuer};
use throttle::FriendRequestThrottle;

/// Application state shared across handlers
pub struct AppState {
    /// Effective configuration
    pub config: NodeConfig,
    /// Accounts and friend requests
    pub store: Arc<dyn Store>,
    /// Friend request state machine over `store`
    pub friendships: FriendshipService<dyn Store>,
    /// Password hashing
    pub passwords: PasswordHasher,
    /// Bearer token signing
    pub tokens: TokenIssuer,
    /// Friend request rate limit
    pub throttle: FriendRequestThrottle,
    /// Node start time
    pub start_time: Instant,
    /// Node name
    pub node_name: String,
}

impl AppState {
    /// Build state from a validated configuration
    pub fn new(config: NodeConfig, store: Arc<dyn Store>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            friendships: FriendshipService::new(Arc::clone(&store)),
            passwords: PasswordHasher::new(config.auth.hash_iterations),
            tokens: TokenIssuer::new(&config.auth),
            throttle: FriendRequestThrottle::new(config.throttle.friend_requests_per_minute),
            start_time: Instant::now(),
            node_name: config.server.name.clone(),
            store,
            config,
        })
    }
}
