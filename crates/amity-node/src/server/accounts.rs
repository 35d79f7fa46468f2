//! Signup, login and token refresh

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

use amity_core::{normalize_email, AmityError, ConflictReason, IdentityStore, NewUser, Result};
use amity_protocol::messages::text;
use amity_protocol::{
    validate_login, validate_signup, AccessTokenResponse, LoginRequest, MessagesResponse,
    RefreshRequest, SignupRequest, TokenResponse,
};

use crate::auth::TokenKind;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Run CPU-bound work (password hashing) off the async workers
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AmityError::Internal(format!("blocking task failed: {}", e)))
}

fn email_taken() -> AmityError {
    let mut fields = amity_core::FieldErrors::new();
    fields.add("email", ConflictReason::EmailTaken.message());
    AmityError::Validation(fields)
}

/// `POST /signup/`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<MessagesResponse>> {
    let Json(req) = payload?;

    let email = normalize_email(&req.email);
    let mut errors = validate_signup(&req);
    if errors.get("email").is_none() && state.store.email_exists(&email).await? {
        errors.add("email", ConflictReason::EmailTaken.message());
    }
    errors.into_result()?;

    let hasher = state.passwords;
    let password = req.password.clone();
    let password_hash = run_blocking(move || hasher.hash(&password)).await?;

    let new_user = NewUser::new(&email, password_hash)
        .with_names(req.first_name.trim(), req.last_name.trim());
    let user = match state.store.create_user(&new_user).await {
        Ok(user) => user,
        // Registered concurrently after the existence check
        Err(AmityError::Conflict(ConflictReason::EmailTaken)) => return Err(email_taken().into()),
        Err(e) => return Err(e.into()),
    };

    info!(user = %user.id, "Account registered");
    Ok(Json(MessagesResponse::single(text::SIGNUP_SUCCESS)))
}

/// `POST /login/`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    validate_login(&req).into_result()?;

    let invalid = || ApiError::from(AmityError::Authentication(text::INVALID_CREDENTIALS.to_string()));

    let username = normalize_email(&req.email);
    let Some(user) = state.store.find_by_username(&username).await? else {
        warn!("Login for unknown account");
        return Err(invalid());
    };

    let hasher = state.passwords;
    let password = req.password;
    let encoded = user.password_hash.clone();
    if !run_blocking(move || hasher.verify(&password, &encoded)).await? {
        warn!(user = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    let refresh = state.tokens.issue(user.id, TokenKind::Refresh)?;
    let access = state.tokens.issue(user.id, TokenKind::Access)?;
    info!(user = %user.id, name = %user.display_name(), "Logged in");

    Ok(Json(TokenResponse {
        messages: vec![text::LOGIN_SUCCESS.to_string()],
        refresh,
        access,
    }))
}

/// `POST /token/refresh/`
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let Json(req) = payload?;

    let claims = state
        .tokens
        .verify(req.refresh.trim(), TokenKind::Refresh)
        .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;
    if state.store.get_user(claims.user()).await?.is_none() {
        return Err(ApiError::Unauthenticated(
            crate::auth::token::INVALID_TOKEN.to_string(),
        ));
    }

    let access = state.tokens.issue(claims.user(), TokenKind::Access)?;
    Ok(Json(AccessTokenResponse { access }))
}
