use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    /// Authenticated, but the record belongs to someone else.
    #[error("not authorized")]
    NotAuthorized,

    /// Deliberately says nothing about which half of the pair was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("refresh token expired")]
    Expired,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::StoreUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::StoreUnavailable(format!("codec: {}", e))
    }
}
