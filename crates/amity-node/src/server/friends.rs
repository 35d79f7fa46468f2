//! Friend request endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};

use amity_core::{AmityError, FriendRequestId, IdentityStore, UserId};
use amity_protocol::messages::text;
use amity_protocol::{ActionResponse, FriendRequestView, FriendshipStatus, UserView};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// `POST /send-friend-request/{target_id}`
pub async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    target: Result<Path<i64>, PathRejection>,
) -> ApiResult<(StatusCode, Json<FriendRequestView>)> {
    let Path(target_id) = target?;
    state.throttle.check(user.id())?;

    let edge = state
        .friendships
        .request_friendship(user.id(), UserId(target_id))
        .await?;
    Ok((StatusCode::CREATED, Json(edge.into())))
}

/// `POST /accept-friend-request/{request_id}`
pub async fn accept_friend_request(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    request: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ActionResponse>> {
    let Path(request_id) = request?;
    state
        .friendships
        .accept_friendship(user.id(), FriendRequestId(request_id))
        .await?;
    Ok(Json(ActionResponse::new(text::ACCEPTED)))
}

/// `POST /reject-friend-request/{request_id}`
pub async fn reject_friend_request(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    request: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ActionResponse>> {
    let Path(request_id) = request?;
    state
        .friendships
        .reject_friendship(user.id(), FriendRequestId(request_id))
        .await?;
    Ok(Json(ActionResponse::new(text::REJECTED)))
}

/// `GET /list-friends/`
pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<UserView>>> {
    let friends = state.friendships.list_friends(user.id()).await?;
    Ok(Json(friends.into_iter().map(Into::into).collect()))
}

/// `GET /list-pending-friend-requests/`
pub async fn list_pending_friend_requests(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<FriendRequestView>>> {
    let pending = state.friendships.list_pending_received(user.id()).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// `GET /friendship-status/{user_id}`
pub async fn friendship_status(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    target: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FriendshipStatus>> {
    let Path(user_id) = target?;
    let other = UserId(user_id);
    if other == user.id() {
        return Err(AmityError::SelfStatus.into());
    }
    if state.store.get_user(other).await?.is_none() {
        return Err(AmityError::UserNotFound(user_id).into());
    }

    let pair = state.friendships.pair_state(user.id(), other).await?;
    Ok(Json(FriendshipStatus {
        user: user_id,
        state: pair,
    }))
}
