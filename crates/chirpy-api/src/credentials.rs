use chrono::Duration;
use thiserror::Error;

use chirpy_db::models::UserRow;
use chirpy_db::{Database, DbError};

use crate::tokens::{ACCESS_TOKEN_TTL_SECS, TokenError, TokenSigner};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// What a successful login hands back to the caller.
#[derive(Debug)]
pub struct Session {
    pub user: UserRow,
    pub access_token: String,
    pub refresh_token: String,
}

/// Login, refresh and revoke, composed from the store and the token signer.
///
/// All methods block: they hash, and they hit the backing file.
pub struct Credentials<'a> {
    db: &'a Database,
    signer: &'a TokenSigner,
}

impl<'a> Credentials<'a> {
    pub fn new(db: &'a Database, signer: &'a TokenSigner) -> Self {
        Self { db, signer }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, CredentialError> {
        let user = self.db.authenticate_user(email, password)?;
        let refresh_token = self.db.issue_refresh_token(user.id)?;
        let access_token = self.access_token(user.id)?;

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token. The refresh token itself is not rotated.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, CredentialError> {
        let user_id = self.db.validate_refresh_token(refresh_token)?;
        self.access_token(user_id)
    }

    /// Already-issued access tokens stay valid until their own expiry.
    pub fn revoke(&self, refresh_token: &str) -> Result<(), CredentialError> {
        Ok(self.db.revoke_refresh_token(refresh_token)?)
    }

    fn access_token(&self, user_id: u64) -> Result<String, CredentialError> {
        Ok(self
            .signer
            .sign(user_id, Duration::seconds(ACCESS_TOKEN_TTL_SECS))?)
    }
}
