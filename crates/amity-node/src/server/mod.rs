//! HTTP server
//!
//! Account, search and friend request routes. Every route except the
//! operational ones is served both with and without a trailing slash.

pub mod accounts;
pub mod friends;
pub mod rest;

use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the server router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(rest::health))
        // Node info
        .route("/api/info", get(rest::node_info));

    let routes: Vec<(&str, MethodRouter<Arc<AppState>>)> = vec![
        // Accounts
        ("/signup", post(accounts::signup)),
        ("/login", post(accounts::login)),
        ("/token/refresh", post(accounts::refresh)),
        ("/search", get(rest::search)),
        // Friend requests
        ("/send-friend-request/:target_id", post(friends::send_friend_request)),
        ("/accept-friend-request/:request_id", post(friends::accept_friend_request)),
        ("/reject-friend-request/:request_id", post(friends::reject_friend_request)),
        ("/list-friends", get(friends::list_friends)),
        ("/list-pending-friend-requests", get(friends::list_pending_friend_requests)),
        ("/friendship-status/:user_id", get(friends::friendship_status)),
    ];

    routes
        .into_iter()
        .fold(router, |router, (path, handler)| {
            router
                .route(path, handler.clone())
                .route(&format!("{}/", path), handler)
        })
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
