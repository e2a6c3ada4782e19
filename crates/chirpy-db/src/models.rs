//! Record types as they are persisted in the backing document.
//! Distinct from chirpy-types API models so password hashes never leave this crate by accident.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChirpRow {
    pub id: u64,
    pub body: String,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: u64,
    pub email: String,
    /// Argon2 PHC string, never plaintext.
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(rename = "is_chirpy_red")]
    pub is_upgraded: bool,
}

/// The token string itself is the map key in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRow {
    pub expires_at: DateTime<Utc>,
    pub user_id: u64,
}
