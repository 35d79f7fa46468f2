//! User identity types
//!
//! Users are owned by the identity store; the friendship core only ever
//! refers to them through a [`UserId`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Normalized email, unique across accounts
    pub email: String,
    /// Derived from the normalized email
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Encoded password hash, never sent to clients
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Full display name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Case-insensitive substring match against the searchable fields
    pub fn matches_term(&self, term: &str) -> bool {
        let term = fold_case(term);
        [&self.username, &self.email, &self.first_name, &self.last_name]
            .iter()
            .any(|field| fold_case(field).contains(&term))
    }
}

/// Data required to create an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl NewUser {
    /// Build a new account record; the email is normalized here
    pub fn new(email: &str, password_hash: impl Into<String>) -> Self {
        Self {
            email: normalize_email(email),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: password_hash.into(),
        }
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Username the account will be stored under
    pub fn username(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Strip surrounding whitespace and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Unicode lowercase form that search compares on
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Split a search string into terms on whitespace and commas
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
