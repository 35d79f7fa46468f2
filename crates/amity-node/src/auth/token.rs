//! Signed bearer tokens
//!
//! A token is `hex(claims_json) "." hex(hmac_sha256(secret, claims_json))`.

use std::time::Duration;

use amity_core::{AmityError, AuthConfig, Result, UserId};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Message for any token that fails verification
pub const INVALID_TOKEN: &str = "Token is invalid or expired";

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Authenticates API requests
    Access,
    /// Exchanged for new access tokens
    Refresh,
}

/// Payload carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn user(&self) -> UserId {
        UserId(self.sub)
    }
}

/// Issues and verifies tokens under one secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    pub fn issue(&self, user: UserId, kind: TokenKind) -> Result<String> {
        self.issue_at(user, kind, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user: UserId, kind: TokenKind, now: DateTime<Utc>) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.get(),
            kind,
            iat,
            exp: iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4().to_string(),
        };

        let payload = serde_json::to_vec(&claims)?;
        let signature = self.sign(&payload)?;
        Ok(format!("{}.{}", hex::encode(&payload), hex::encode(signature)))
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        self.verify_at(token, kind, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<Claims> {
        let (payload_hex, signature_hex) = token.split_once('.').ok_or_else(invalid)?;
        let payload = hex::decode(payload_hex).map_err(|_| invalid())?;
        let signature = hex::decode(signature_hex).map_err(|_| invalid())?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature).map_err(|_| invalid())?;

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| invalid())?;
        if claims.kind != kind || claims.exp <= now.timestamp() {
            return Err(invalid());
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AmityError::Internal(format!("hmac key: {}", e)))
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn invalid() -> AmityError {
    AmityError::Authentication(INVALID_TOKEN.to_string())
}
