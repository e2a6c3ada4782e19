use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use chirpy_db::models::UserRow;
use chirpy_types::api::{CreateUserRequest, UpdateUserRequest, UserResponse};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, blocking};

fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        is_chirpy_red: user.is_upgraded,
    }
}

fn validate(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "email and password are required",
        ));
    }
    Ok(())
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req.email, &req.password)?;

    let user = blocking(&state, move |s| s.db.create_user(&req.email, &req.password)).await?;
    info!("Created user {}", user.id);

    Ok((StatusCode::CREATED, Json(user_response(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req.email, &req.password)?;

    let user = blocking(&state, move |s| {
        s.db.update_user(user_id, &req.email, &req.password)
    })
    .await?;

    Ok(Json(user_response(user)))
}
