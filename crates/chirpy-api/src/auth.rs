use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::info;

use chirpy_types::api::{LoginRequest, LoginResponse, RefreshResponse};

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::middleware::authorization;
use crate::{AppState, blocking};

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = blocking(&state, move |s| {
        Credentials::new(&s.db, &s.signer).login(&req.email, &req.password)
    })
    .await?;
    info!("User {} logged in", session.user.id);

    Ok(Json(LoginResponse {
        id: session.user.id,
        email: session.user.email,
        is_chirpy_red: session.user.is_upgraded,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// `Authorization: Bearer <refresh token>` → fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = authorization(&headers, "Bearer ")?.to_string();

    let token = blocking(&state, move |s| {
        Credentials::new(&s.db, &s.signer).refresh(&refresh_token)
    })
    .await?;

    Ok(Json(RefreshResponse { token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = authorization(&headers, "Bearer ")?.to_string();

    blocking(&state, move |s| {
        Credentials::new(&s.db, &s.signer).revoke(&refresh_token)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
