use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::AppState;
use crate::error::ApiError;

/// The authenticated caller, taken from a valid `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub u64);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = authorization(&parts.headers, "Bearer ")?;
        let user_id = state.signer.verify(token)?;
        Ok(AuthUser(user_id))
    }
}

/// Pull the credential out of an `Authorization: <scheme> <credential>` header.
pub fn authorization<'h>(headers: &'h HeaderMap, scheme: &str) -> Result<&'h str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(scheme))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_credential_for_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        assert_eq!(authorization(&headers, "Bearer ").unwrap(), "abc");
        assert!(authorization(&headers, "ApiKey ").is_err());
    }

    #[test]
    fn missing_or_empty_header() {
        let mut headers = HeaderMap::new();
        assert!(authorization(&headers, "Bearer ").is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(authorization(&headers, "Bearer ").is_err());
    }
}
