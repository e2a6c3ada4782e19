use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use chirpy_db::DbError;
use chirpy_types::api::ErrorResponse;

use crate::chirps::ChirpTooLong;
use crate::credentials::CredentialError;
use crate::tokens::TokenError;

/// Status plus a short message, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        let status = match &e {
            DbError::NotFound => StatusCode::NOT_FOUND,
            DbError::NotAuthorized => StatusCode::FORBIDDEN,
            DbError::InvalidCredentials | DbError::Expired => StatusCode::UNAUTHORIZED,
            DbError::DuplicateEmail => StatusCode::CONFLICT,
            DbError::StoreUnavailable(_) | DbError::Hash(_) => {
                error!("Store error: {}", e);
                return Self::internal();
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => Self::unauthorized(),
            TokenError::Sign(e) => {
                error!("Access token signing failed: {}", e);
                Self::internal()
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        match e {
            // Unknown and expired refresh tokens look the same from outside.
            CredentialError::Db(DbError::NotFound | DbError::Expired) => Self::unauthorized(),
            CredentialError::Db(e) => e.into(),
            CredentialError::Token(e) => e.into(),
        }
    }
}

impl From<ChirpTooLong> for ApiError {
    fn from(e: ChirpTooLong) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (DbError::NotFound, StatusCode::NOT_FOUND),
            (DbError::NotAuthorized, StatusCode::FORBIDDEN),
            (DbError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DbError::Expired, StatusCode::UNAUTHORIZED),
            (DbError::DuplicateEmail, StatusCode::CONFLICT),
            (
                DbError::StoreUnavailable("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn missing_refresh_token_is_unauthorized() {
        let err = ApiError::from(CredentialError::Db(DbError::NotFound));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
