//! In-memory storage backend
//!
//! All state sits behind one lock, so the pair check and the insert in
//! [`RelationshipStore::insert_edge`] happen as a single step.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use amity_core::view::{friends_of, pending_for};
use amity_core::{
    AmityError, ConflictReason, FriendEdge, FriendRequestId, IdentityStore, Insertion, NewUser,
    PairKey, RelationshipStore, Result, User, UserId,
};

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    edges: BTreeMap<FriendRequestId, FriendEdge>,
    pairs: BTreeMap<PairKey, FriendRequestId>,
    next_user: i64,
    next_edge: i64,
}

impl Inner {
    fn edge_for_pair(&self, key: PairKey) -> Option<&FriendEdge> {
        self.pairs.get(&key).and_then(|id| self.edges.get(id))
    }

    fn remove_edge(&mut self, id: FriendRequestId) {
        if let Some(edge) = self.edges.remove(&id) {
            self.pairs.remove(&edge.pair_key());
        }
    }
}

/// Volatile store, lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Number of stored edges, pending and accepted
    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut inner = self.inner.write();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AmityError::Conflict(ConflictReason::EmailTaken));
        }

        inner.next_user += 1;
        let created = User {
            id: UserId(inner.next_user),
            email: user.email.clone(),
            username: user.username(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: user.password_hash.clone(),
            date_joined: Utc::now(),
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let email = amity_core::normalize_email(email);
        Ok(self.inner.read().users.values().any(|u| u.email == email))
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let inner = self.inner.read();
        let mut users: Vec<User> = ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect();
        users.sort_by_key(|u| u.id);
        users.dedup_by_key(|u| u.id);
        Ok(users)
    }

    async fn search_users(&self, terms: &[String], limit: u32) -> Result<Vec<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .filter(|u| terms.iter().all(|term| u.matches_term(term)))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn edge_between(&self, a: UserId, b: UserId) -> Result<Option<FriendEdge>> {
        Ok(self.inner.read().edge_for_pair(PairKey::new(a, b)).cloned())
    }

    async fn get_edge(&self, id: FriendRequestId) -> Result<Option<FriendEdge>> {
        Ok(self.inner.read().edges.get(&id).cloned())
    }

    async fn insert_edge(&self, sender: UserId, receiver: UserId) -> Result<Insertion> {
        let key = PairKey::new(sender, receiver);
        let mut inner = self.inner.write();
        if let Some(existing) = inner.edge_for_pair(key) {
            return Ok(Insertion::Occupied(existing.clone()));
        }

        inner.next_edge += 1;
        let edge = FriendEdge {
            id: FriendRequestId(inner.next_edge),
            sender,
            receiver,
            created_at: Utc::now(),
            accepted: false,
        };
        inner.pairs.insert(key, edge.id);
        inner.edges.insert(edge.id, edge.clone());
        Ok(Insertion::Created(edge))
    }

    async fn mark_accepted(&self, id: FriendRequestId) -> Result<bool> {
        let mut inner = self.inner.write();
        match inner.edges.get_mut(&id) {
            Some(edge) if edge.is_pending() => {
                edge.accepted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending(&self, id: FriendRequestId) -> Result<bool> {
        let mut inner = self.inner.write();
        let pending = inner.edges.get(&id).is_some_and(FriendEdge::is_pending);
        if pending {
            inner.remove_edge(id);
        }
        Ok(pending)
    }

    async fn list_friend_ids(&self, user: UserId) -> Result<Vec<UserId>> {
        let inner = self.inner.read();
        Ok(friends_of(inner.edges.values(), user).into_iter().collect())
    }

    async fn list_pending_received(&self, user: UserId) -> Result<Vec<FriendEdge>> {
        let inner = self.inner.read();
        Ok(pending_for(inner.edges.values(), user))
    }
}
