//! SQLite-backed storage using sqlx
//!
//! The at-most-one-edge rule is a `UNIQUE (pair_low, pair_high)` constraint
//! over the normalized pair, so concurrent inserts for the same pair cannot
//! both land.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

use amity_core::{
    fold_case, AmityError, ConflictReason, FriendEdge, FriendRequestId, IdentityStore, Insertion,
    NewUser, PairKey, RelationshipStore, User, UserId,
};

use crate::error::{Result, StateError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        date_joined TEXT NOT NULL,
        username_folded TEXT NOT NULL,
        email_folded TEXT NOT NULL,
        first_name_folded TEXT NOT NULL,
        last_name_folded TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friend_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sender_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        receiver_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        pair_low INTEGER NOT NULL,
        pair_high INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        accepted INTEGER NOT NULL DEFAULT 0,
        CHECK (sender_id <> receiver_id),
        CHECK (pair_low < pair_high),
        UNIQUE (pair_low, pair_high)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_friend_requests_receiver ON friend_requests(receiver_id, accepted)",
    "CREATE INDEX IF NOT EXISTS idx_friend_requests_sender ON friend_requests(sender_id, accepted)",
];

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, date_joined";

// SQLite's LIKE only folds ASCII, so search runs against these
const FOLDED_COLUMNS: [&str; 4] = [
    "username_folded",
    "email_folded",
    "first_name_folded",
    "last_name_folded",
];

const EDGE_COLUMNS: &str = "id, sender_id, receiver_id, created_at, accepted";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            date_joined: row.date_joined,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EdgeRow {
    id: i64,
    sender_id: i64,
    receiver_id: i64,
    created_at: DateTime<Utc>,
    accepted: bool,
}

impl From<EdgeRow> for FriendEdge {
    fn from(row: EdgeRow) -> Self {
        Self {
            id: FriendRequestId(row.id),
            sender: UserId(row.sender_id),
            receiver: UserId(row.receiver_id),
            created_at: row.created_at,
            accepted: row.accepted,
        }
    }
}

/// SQLite store for accounts and friend requests
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a database file
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        Self::connect(options, max_connections).await
    }

    /// A private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StateError::Connection(e.to_string()))?;
        // Every connection would see its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options.foreign_keys(true))
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let options = options
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StateError::Migration(e.to_string()))?;
        }
        info!("Database schema ready");
        Ok(())
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn fetch_edge_for_pair(&self, key: PairKey) -> Result<Option<FriendEdge>> {
        let row: Option<EdgeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM friend_requests WHERE pair_low = ?1 AND pair_high = ?2",
            EDGE_COLUMNS
        ))
        .bind(key.low.get())
        .bind(key.high.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

/// Escape LIKE wildcards so a search term matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn create_user(&self, user: &NewUser) -> amity_core::Result<User> {
        let username = user.username();
        let date_joined = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, username, first_name, last_name, password_hash, date_joined,
                                username_folded, email_folded, first_name_folded, last_name_folded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&user.email)
        .bind(&username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(date_joined)
        .bind(fold_case(&username))
        .bind(fold_case(&user.email))
        .bind(fold_case(&user.first_name))
        .bind(fold_case(&user.last_name))
        .execute(&self.pool)
        .await
        .map_err(StateError::from);

        match result {
            Ok(done) => {
                let id = UserId(done.last_insert_rowid());
                debug!(user = %id, "Created user");
                Ok(User {
                    id,
                    email: user.email.clone(),
                    username,
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    password_hash: user.password_hash.clone(),
                    date_joined,
                })
            }
            Err(err) if err.is_duplicate() => Err(AmityError::Conflict(ConflictReason::EmailTaken)),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_user(&self, id: UserId) -> amity_core::Result<Option<User>> {
        Ok(self.fetch_user(id).await?)
    }

    async fn find_by_username(&self, username: &str) -> amity_core::Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(StateError::from)?;
        Ok(row.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> amity_core::Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1 COLLATE NOCASE")
                .bind(email.trim())
                .fetch_one(&self.pool)
                .await
                .map_err(StateError::from)?;
        Ok(count > 0)
    }

    async fn get_users(&self, ids: &[UserId]) -> amity_core::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE id IN (", USER_COLUMNS));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.get());
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<UserRow> = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StateError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_users(&self, terms: &[String], limit: u32) -> amity_core::Result<Vec<User>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));
        for term in terms {
            let pattern = like_pattern(&fold_case(term));
            query.push(" AND (");
            for (i, column) in FOLDED_COLUMNS.iter().enumerate() {
                if i > 0 {
                    query.push(" OR ");
                }
                query.push(*column);
                query.push(" LIKE ");
                query.push_bind(pattern.clone());
                query.push(" ESCAPE '\\'");
            }
            query.push(")");
        }
        query.push(" ORDER BY id LIMIT ");
        query.push_bind(i64::from(limit));

        let rows: Vec<UserRow> = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StateError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RelationshipStore for SqliteStore {
    async fn edge_between(&self, a: UserId, b: UserId) -> amity_core::Result<Option<FriendEdge>> {
        Ok(self.fetch_edge_for_pair(PairKey::new(a, b)).await?)
    }

    async fn get_edge(&self, id: FriendRequestId) -> amity_core::Result<Option<FriendEdge>> {
        let row: Option<EdgeRow> =
            sqlx::query_as(&format!("SELECT {} FROM friend_requests WHERE id = ?1", EDGE_COLUMNS))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(StateError::from)?;
        Ok(row.map(Into::into))
    }

    async fn insert_edge(&self, sender: UserId, receiver: UserId) -> amity_core::Result<Insertion> {
        let key = PairKey::new(sender, receiver);
        let created_at = Utc::now();
        let done = sqlx::query(
            "INSERT INTO friend_requests (sender_id, receiver_id, pair_low, pair_high, created_at, accepted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)
             ON CONFLICT (pair_low, pair_high) DO NOTHING",
        )
        .bind(sender.get())
        .bind(receiver.get())
        .bind(key.low.get())
        .bind(key.high.get())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(StateError::from)?;

        if done.rows_affected() == 1 {
            return Ok(Insertion::Created(FriendEdge {
                id: FriendRequestId(done.last_insert_rowid()),
                sender,
                receiver,
                created_at,
                accepted: false,
            }));
        }

        match self.fetch_edge_for_pair(key).await? {
            Some(edge) => Ok(Insertion::Occupied(edge)),
            None => Err(AmityError::Storage(format!(
                "pair ({}, {}) was vacated during insert",
                key.low, key.high
            ))),
        }
    }

    async fn mark_accepted(&self, id: FriendRequestId) -> amity_core::Result<bool> {
        let done = sqlx::query("UPDATE friend_requests SET accepted = 1 WHERE id = ?1 AND accepted = 0")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(StateError::from)?;
        Ok(done.rows_affected() == 1)
    }

    async fn delete_pending(&self, id: FriendRequestId) -> amity_core::Result<bool> {
        let done = sqlx::query("DELETE FROM friend_requests WHERE id = ?1 AND accepted = 0")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(StateError::from)?;
        Ok(done.rows_affected() == 1)
    }

    async fn list_friend_ids(&self, user: UserId) -> amity_core::Result<Vec<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT CASE WHEN sender_id = ?1 THEN receiver_id ELSE sender_id END
             FROM friend_requests
             WHERE accepted = 1 AND (sender_id = ?1 OR receiver_id = ?1)",
        )
        .bind(user.get())
        .fetch_all(&self.pool)
        .await
        .map_err(StateError::from)?;
        Ok(ids.into_iter().map(UserId).collect())
    }

    async fn list_pending_received(&self, user: UserId) -> amity_core::Result<Vec<FriendEdge>> {
        let rows: Vec<EdgeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM friend_requests
             WHERE receiver_id = ?1 AND accepted = 0
             ORDER BY created_at, id",
            EDGE_COLUMNS
        ))
        .bind(user.get())
        .fetch_all(&self.pool)
        .await
        .map_err(StateError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
