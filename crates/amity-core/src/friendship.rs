//! Friend requests and the relationship state machine
//!
//! A pair of users `{A, B}` is always in one of four states: no edge, a
//! pending request in either direction, or friends. The decision functions
//! here take the current edge for a pair and either reject the action or
//! return the single edge mutation it causes. They never touch storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmityError, ConflictReason, Response, Result};
use crate::identity::UserId;

/// Unique identifier for a friend request edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendRequestId(pub i64);

impl FriendRequestId {
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for FriendRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed friend request, pending or accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEdge {
    pub id: FriendRequestId,
    pub sender: UserId,
    pub receiver: UserId,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
}

impl FriendEdge {
    /// Normalized key of the unordered pair this edge occupies
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.sender, self.receiver)
    }

    /// Check if the user is either end of this edge
    pub fn involves(&self, user: UserId) -> bool {
        self.sender == user || self.receiver == user
    }

    /// The user on the other end from `user`, if `user` is on this edge
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if self.sender == user {
            Some(self.receiver)
        } else if self.receiver == user {
            Some(self.sender)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.accepted
    }
}

/// Unordered pair of users, stored as `(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub low: UserId,
    pub high: UserId,
}

impl PairKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// State of a pair as seen by one of its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    /// No edge between the pair
    NoEdge,
    /// The viewer sent a request that is still pending
    PendingOutgoing,
    /// The other member sent a request that is still pending
    PendingIncoming,
    /// An accepted edge connects the pair
    Friends,
}

impl PairState {
    /// Classify the pair `{viewer, other}` from its current edge
    pub fn classify(viewer: UserId, edge: Option<&FriendEdge>) -> Self {
        match edge {
            None => PairState::NoEdge,
            Some(edge) if edge.accepted => PairState::Friends,
            Some(edge) if edge.sender == viewer => PairState::PendingOutgoing,
            Some(_) => PairState::PendingIncoming,
        }
    }
}

/// Edge mutation produced by an allowed action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Insert a new pending edge
    Create { sender: UserId, receiver: UserId },
    /// Flip an existing edge to accepted
    Accept(FriendRequestId),
    /// Remove an existing pending edge
    Delete(FriendRequestId),
}

/// Decide a friend request from `actor` to `target`
///
/// `existing` is the edge currently occupying the pair, in either direction.
pub fn decide_request(
    actor: UserId,
    target: UserId,
    existing: Option<&FriendEdge>,
) -> Result<Transition> {
    if actor == target {
        return Err(AmityError::SelfRequest);
    }

    if let Some(edge) = existing {
        debug_assert_eq!(edge.pair_key(), PairKey::new(actor, target));
    }

    match PairState::classify(actor, existing) {
        PairState::NoEdge => Ok(Transition::Create {
            sender: actor,
            receiver: target,
        }),
        PairState::PendingOutgoing => Err(AmityError::Conflict(ConflictReason::AlreadySent)),
        PairState::PendingIncoming => Err(AmityError::Conflict(ConflictReason::AlreadyReceived)),
        PairState::Friends => Err(AmityError::Conflict(ConflictReason::AlreadyFriends)),
    }
}

/// Decide whether `actor` may accept `edge`
pub fn decide_accept(actor: UserId, edge: &FriendEdge) -> Result<Transition> {
    authorize_response(actor, edge, Response::Accept)?;
    if edge.accepted {
        return Err(AmityError::Conflict(ConflictReason::AlreadyAccepted));
    }
    Ok(Transition::Accept(edge.id))
}

/// Decide whether `actor` may reject `edge`
pub fn decide_reject(actor: UserId, edge: &FriendEdge) -> Result<Transition> {
    authorize_response(actor, edge, Response::Reject)?;
    if edge.accepted {
        return Err(AmityError::Conflict(ConflictReason::FriendshipEstablished));
    }
    Ok(Transition::Delete(edge.id))
}

/// Only the receiver of a request may answer it
fn authorize_response(actor: UserId, edge: &FriendEdge, action: Response) -> Result<()> {
    if edge.receiver != actor {
        return Err(AmityError::Unauthorized { action });
    }
    Ok(())
}
