//! Error types for the Amity backend
//!
//! Every operation on the friendship core reports one of these kinds. The HTTP
//! layer maps them onto status codes; nothing here is retried.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Why an action collided with the existing edge for a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The actor already has a pending request out to the target
    AlreadySent,
    /// The target already has a pending request out to the actor
    AlreadyReceived,
    /// The pair is already connected by an accepted edge
    AlreadyFriends,
    /// The edge being accepted was accepted earlier
    AlreadyAccepted,
    /// The edge being rejected has already become a friendship
    FriendshipEstablished,
    /// An account with the same email exists
    EmailTaken,
}

impl ConflictReason {
    /// User-facing message for this conflict
    pub fn message(&self) -> &'static str {
        match self {
            ConflictReason::AlreadySent => "Friend request already sent.",
            ConflictReason::AlreadyReceived => "Friend request already received.",
            ConflictReason::AlreadyFriends => "You are already friends with this user.",
            ConflictReason::AlreadyAccepted => "Friend request already accepted.",
            ConflictReason::FriendshipEstablished => "Friendship already established.",
            ConflictReason::EmailTaken => "User with this email already exists.",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Which response to a friend request was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Accept,
    Reject,
}

impl Response {
    pub fn verb(&self) -> &'static str {
        match self {
            Response::Accept => "accept",
            Response::Reject => "reject",
        }
    }
}

/// Per-field validation messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// All messages, field by field
    pub fn messages(&self) -> Vec<String> {
        self.0.values().flatten().cloned().collect()
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AmityError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Main error type for Amity
#[derive(Error, Debug)]
pub enum AmityError {
    // ===== Friendship Errors =====
    /// Action targets the actor itself
    #[error("You cannot send a friend request to yourself.")]
    SelfRequest,

    /// Friendship status was asked about the actor itself
    #[error("You cannot check friendship status with yourself.")]
    SelfStatus,

    /// Action collides with the pair's existing edge
    #[error("{0}")]
    Conflict(ConflictReason),

    /// Actor is not the receiver of the request it tried to answer
    #[error("You are not authorized to {} this friend request.", .action.verb())]
    Unauthorized { action: Response },

    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// Referenced friend request does not exist
    #[error("Friend request not found: {0}")]
    RequestNotFound(i64),

    // ===== Account Errors =====
    /// Malformed input, reported before any mutation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Bad credentials or an unusable token
    #[error("{0}")]
    Authentication(String),

    /// Caller exceeded a throttle
    #[error("Request was throttled. Expected available in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    // ===== Infrastructure Errors =====
    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AmityError {
    /// Check if this error was caused by the caller's input or identity
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AmityError::Storage(_)
                | AmityError::InvalidConfig(_)
                | AmityError::Serialization(_)
                | AmityError::Internal(_)
        )
    }

    /// Check if this is a not-found error of either kind
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AmityError::UserNotFound(_) | AmityError::RequestNotFound(_)
        )
    }

    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AmityError::SelfRequest | AmityError::SelfStatus => "INVALID_OPERATION",
            AmityError::Conflict(reason) => match reason {
                ConflictReason::AlreadySent => "ALREADY_SENT",
                ConflictReason::AlreadyReceived => "ALREADY_RECEIVED",
                ConflictReason::AlreadyFriends => "ALREADY_FRIENDS",
                ConflictReason::AlreadyAccepted => "ALREADY_ACCEPTED",
                ConflictReason::FriendshipEstablished => "FRIENDSHIP_ESTABLISHED",
                ConflictReason::EmailTaken => "EMAIL_TAKEN",
            },
            AmityError::Unauthorized { .. } => "UNAUTHORIZED",
            AmityError::UserNotFound(_) => "USER_NOT_FOUND",
            AmityError::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            AmityError::Validation(_) => "VALIDATION_ERROR",
            AmityError::Authentication(_) => "AUTHENTICATION_FAILED",
            AmityError::RateLimited { .. } => "RATE_LIMITED",
            AmityError::Storage(_) => "STORAGE_ERROR",
            AmityError::InvalidConfig(_) => "INVALID_CONFIG",
            AmityError::Serialization(_) => "SERIALIZATION_ERROR",
            AmityError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for Amity operations
pub type Result<T> = std::result::Result<T, AmityError>;

impl From<serde_json::Error> for AmityError {
    fn from(err: serde_json::Error) -> Self {
        AmityError::Serialization(err.to_string())
    }
}
