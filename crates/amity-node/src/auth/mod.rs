//! Authentication: password hashing, bearer tokens and the request extractor

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer, TokenKind};

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use amity_core::{IdentityStore, User, UserId};

use crate::error::ApiError;
use crate::AppState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";

/// The authenticated caller, resolved from `Authorization: Bearer <access>`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthenticated(MISSING_CREDENTIALS.to_string()))?;

        let claims = state
            .tokens
            .verify(token, TokenKind::Access)
            .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

        // The account may be gone since the token was issued
        let user = state
            .store
            .get_user(claims.user())
            .await?
            .ok_or_else(|| ApiError::Unauthenticated(token::INVALID_TOKEN.to_string()))?;

        Ok(CurrentUser(user))
    }
}
