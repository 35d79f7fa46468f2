//! Request and response bodies of the HTTP API

use amity_core::{FriendEdge, PairState, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Public representation of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Public representation of a friend request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequestView {
    pub id: i64,
    pub sender: i64,
    pub receiver: i64,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
}

impl From<FriendEdge> for FriendRequestView {
    fn from(edge: FriendEdge) -> Self {
        Self {
            id: edge.id.get(),
            sender: edge.sender.get(),
            receiver: edge.receiver.get(),
            created_at: edge.created_at,
            accepted: edge.accepted,
        }
    }
}

/// Relationship between the caller and another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipStatus {
    pub user: i64,
    pub state: PairState,
}

/// `POST /signup/`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

/// `POST /login/`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /token/refresh/`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// `GET /search/?search=...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub search: String,
}

/// Success envelope carrying a list of messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<String>,
}

impl MessagesResponse {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Login response: messages plus both tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub messages: Vec<String>,
    pub refresh: String,
    pub access: String,
}

/// Token refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Single-message acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

/// Fixed user-facing messages
pub mod text {
    pub const SIGNUP_SUCCESS: &str = "You have been registered successfully.";
    pub const LOGIN_SUCCESS: &str = "Success";
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    pub const PASSWORD_MISMATCH: &str = "Password and confirm Password did not match.";
    pub const INVALID_EMAIL: &str = "Enter a valid email address.";
    pub const FIELD_REQUIRED: &str = "This field is required.";
    pub const ACCEPTED: &str = "Friend request accepted successfully.";
    pub const REJECTED: &str = "Friend request rejected successfully.";
}
