//! Operational endpoints and user search

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use amity_core::{search_terms, IdentityStore, StorageBackend};
use amity_protocol::{SearchQuery, UserView};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Node info endpoint
#[derive(Serialize)]
pub struct NodeInfo {
    pub version: &'static str,
    pub name: String,
    pub storage: StorageBackend,
    pub uptime_seconds: u64,
}

pub async fn node_info(State(state): State<Arc<AppState>>) -> Json<NodeInfo> {
    Json(NodeInfo {
        version: env!("CARGO_PKG_VERSION"),
        name: state.node_name.clone(),
        storage: state.config.storage.backend,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// `GET /search/?search=<terms>`
pub async fn search(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<UserView>>> {
    let terms = search_terms(&query.search);
    let users = state
        .store
        .search_users(&terms, state.config.search.max_results)
        .await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}
