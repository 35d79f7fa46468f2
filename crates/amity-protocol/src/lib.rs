//! Amity Protocol - JSON wire types for the HTTP API
//!
//! This crate defines the request/response bodies exchanged with clients and
//! the input validation that runs before any store access.

pub mod messages;
pub mod validate;

pub use messages::{
    AccessTokenResponse, ActionResponse, ErrorBody, FriendRequestView, FriendshipStatus,
    LoginRequest, MessagesResponse, RefreshRequest, SearchQuery, SignupRequest, TokenResponse,
    UserView,
};
pub use validate::{validate_login, validate_signup};
