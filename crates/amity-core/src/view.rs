//! Friendship view derived from a set of edges
//!
//! Pure functions; used by the in-memory store and for presenting a user's
//! relationships.

use std::collections::BTreeSet;

use crate::friendship::FriendEdge;
use crate::identity::UserId;

/// Relationships of one focal user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendshipView {
    /// Users connected to the focal user by an accepted edge
    pub friends: BTreeSet<UserId>,
    /// Pending requests addressed to the focal user, oldest first
    pub incoming: Vec<FriendEdge>,
}

impl FriendshipView {
    /// Derive the view for `focal` from `edges`
    pub fn derive<'a, I>(edges: I, focal: UserId) -> Self
    where
        I: IntoIterator<Item = &'a FriendEdge>,
    {
        let mut view = FriendshipView::default();
        for edge in edges {
            if edge.accepted {
                if let Some(peer) = edge.peer_of(focal) {
                    view.friends.insert(peer);
                }
            } else if edge.receiver == focal {
                view.incoming.push(edge.clone());
            }
        }
        view.incoming
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        view
    }

    pub fn is_friend(&self, user: UserId) -> bool {
        self.friends.contains(&user)
    }
}

/// Friend set of `focal`
pub fn friends_of<'a, I>(edges: I, focal: UserId) -> BTreeSet<UserId>
where
    I: IntoIterator<Item = &'a FriendEdge>,
{
    edges
        .into_iter()
        .filter(|edge| edge.accepted)
        .filter_map(|edge| edge.peer_of(focal))
        .collect()
}

/// Pending requests addressed to `focal`
pub fn pending_for<'a, I>(edges: I, focal: UserId) -> Vec<FriendEdge>
where
    I: IntoIterator<Item = &'a FriendEdge>,
{
    FriendshipView::derive(edges, focal).incoming
}
