//! Friendship operations against a store
//!
//! Each operation reads the current edge, asks the state machine for a
//! decision and applies the resulting [`Transition`]. Every failure leaves
//! the store untouched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AmityError, Result};
use crate::friendship::{
    decide_accept, decide_reject, decide_request, FriendEdge, FriendRequestId, PairState,
    Transition,
};
use crate::identity::{User, UserId};
use crate::{Insertion, Store};

/// Runs friend request actions on behalf of an explicit actor
pub struct FriendshipService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> Clone for FriendshipService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store + ?Sized> FriendshipService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Send a friend request from `actor` to `target`
    pub async fn request_friendship(&self, actor: UserId, target: UserId) -> Result<FriendEdge> {
        if actor == target {
            return Err(AmityError::SelfRequest);
        }
        if self.store.get_user(target).await?.is_none() {
            return Err(AmityError::UserNotFound(target.get()));
        }

        let existing = self.store.edge_between(actor, target).await?;
        let (sender, receiver) = match decide_request(actor, target, existing.as_ref())? {
            Transition::Create { sender, receiver } => (sender, receiver),
            other => return Err(unexpected(other)),
        };

        match self.store.insert_edge(sender, receiver).await? {
            Insertion::Created(edge) => {
                info!(request = %edge.id, sender = %sender, receiver = %receiver, "Friend request sent");
                Ok(edge)
            }
            Insertion::Occupied(edge) => {
                // Lost a race for the pair; report the edge that won
                debug!(request = %edge.id, "Pair taken by concurrent request");
                decide_request(actor, target, Some(&edge))
                    .and_then(|t| Err(unexpected(t)))
            }
        }
    }

    /// Accept the request `id` as `actor`
    pub async fn accept_friendship(&self, actor: UserId, id: FriendRequestId) -> Result<FriendEdge> {
        let edge = self.load_edge(id).await?;
        let id = match decide_accept(actor, &edge)? {
            Transition::Accept(id) => id,
            other => return Err(unexpected(other)),
        };

        if !self.store.mark_accepted(id).await? {
            // Answered or withdrawn since it was read
            let current = self.load_edge(id).await?;
            return decide_accept(actor, &current).and_then(|t| Err(unexpected(t)));
        }

        info!(request = %id, sender = %edge.sender, receiver = %actor, "Friend request accepted");
        Ok(FriendEdge {
            accepted: true,
            ..edge
        })
    }

    /// Reject the request `id` as `actor`, deleting it
    pub async fn reject_friendship(&self, actor: UserId, id: FriendRequestId) -> Result<()> {
        let edge = self.load_edge(id).await?;
        let id = match decide_reject(actor, &edge)? {
            Transition::Delete(id) => id,
            other => return Err(unexpected(other)),
        };

        if !self.store.delete_pending(id).await? {
            let current = self.load_edge(id).await?;
            return decide_reject(actor, &current).and_then(|t| Err(unexpected(t)));
        }

        info!(request = %id, sender = %edge.sender, receiver = %actor, "Friend request rejected");
        Ok(())
    }

    /// Everyone connected to `user` by an accepted edge
    pub async fn list_friends(&self, user: UserId) -> Result<Vec<User>> {
        let mut ids = self.store.list_friend_ids(user).await?;
        ids.sort();
        ids.dedup();
        self.store.get_users(&ids).await
    }

    /// Pending requests addressed to `user`
    pub async fn list_pending_received(&self, user: UserId) -> Result<Vec<FriendEdge>> {
        self.store.list_pending_received(user).await
    }

    /// State of the pair `{viewer, other}` as seen by `viewer`
    pub async fn pair_state(&self, viewer: UserId, other: UserId) -> Result<PairState> {
        let edge = self.store.edge_between(viewer, other).await?;
        Ok(PairState::classify(viewer, edge.as_ref()))
    }

    async fn load_edge(&self, id: FriendRequestId) -> Result<FriendEdge> {
        self.store
            .get_edge(id)
            .await?
            .ok_or(AmityError::RequestNotFound(id.get()))
    }
}

fn unexpected(transition: Transition) -> AmityError {
    AmityError::Internal(format!("unexpected transition {:?}", transition))
}
