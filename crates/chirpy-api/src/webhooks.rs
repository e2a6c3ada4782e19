use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, info};

use chirpy_types::api::{PolkaWebhook, USER_UPGRADED_EVENT};

use crate::error::ApiError;
use crate::middleware::authorization;
use crate::{AppState, blocking};

/// Payment provider callback, authenticated with `Authorization: ApiKey <key>`.
///
/// The body is only decoded once the key checks out.
pub async fn polka(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let key = authorization(&headers, "ApiKey ")?;
    if state.polka_key.is_empty() || key != state.polka_key {
        return Err(ApiError::unauthorized());
    }

    let hook: PolkaWebhook = serde_json::from_slice(&body).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid webhook body: {}", e),
        )
    })?;

    if hook.event != USER_UPGRADED_EVENT {
        debug!("Ignoring webhook event {}", hook.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = hook.data.user_id;
    blocking(&state, move |s| s.db.upgrade_user(user_id)).await?;
    info!("User {} upgraded", user_id);

    Ok(StatusCode::NO_CONTENT)
}
