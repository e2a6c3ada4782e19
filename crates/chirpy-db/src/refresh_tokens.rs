use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::Database;
use crate::error::{DbError, Result};
use crate::models::RefreshTokenRow;

pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// 256 bits from the thread-local CSPRNG, lowercase hex.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

impl Database {
    /// Issue a refresh token for `user_id`, valid for 60 days.
    pub fn issue_refresh_token(&self, user_id: u64) -> Result<String> {
        self.issue_refresh_token_with_ttl(user_id, Duration::days(REFRESH_TOKEN_TTL_DAYS))
    }

    pub fn issue_refresh_token_with_ttl(&self, user_id: u64, ttl: Duration) -> Result<String> {
        let token = generate_token();
        let row = RefreshTokenRow {
            expires_at: Utc::now() + ttl,
            user_id,
        };

        self.with_snapshot_mut(|snap| {
            snap.refresh_tokens.insert(token.clone(), row);
            Ok(())
        })?;

        debug!("Issued refresh token for user {}", user_id);
        Ok(token)
    }

    /// Resolve a refresh token to its user id.
    pub fn validate_refresh_token(&self, token: &str) -> Result<u64> {
        self.validate_refresh_token_at(token, Utc::now())
    }

    /// Expiry is lazy: a token past `expires_at` stays on disk but reports `Expired`.
    pub fn validate_refresh_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<u64> {
        let row = self
            .with_snapshot(|snap| snap.refresh_tokens.get(token).cloned())?
            .ok_or(DbError::NotFound)?;

        if now > row.expires_at {
            return Err(DbError::Expired);
        }
        Ok(row.user_id)
    }

    pub fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        self.with_snapshot_mut(|snap| {
            snap.refresh_tokens
                .remove(token)
                .map(|_| ())
                .ok_or(DbError::NotFound)
        })
    }

    /// Drop every token that expired before `now`. Returns how many were removed.
    pub fn purge_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_snapshot_mut(|snap| {
            let before = snap.refresh_tokens.len();
            snap.refresh_tokens.retain(|_, row| now <= row.expires_at);
            Ok(before - snap.refresh_tokens.len())
        })
    }
}
