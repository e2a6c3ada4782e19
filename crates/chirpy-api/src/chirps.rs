use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use thiserror::Error;

use chirpy_db::SortOrder;
use chirpy_db::models::ChirpRow;
use chirpy_types::api::{ChirpResponse, CreateChirpRequest};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, blocking};

pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

#[derive(Debug, Error)]
#[error("chirp is too long")]
pub struct ChirpTooLong;

/// Enforce the length limit (in characters) and mask profanity word by word.
pub fn clean_body(body: &str) -> Result<String, ChirpTooLong> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ChirpTooLong);
    }

    let cleaned: Vec<&str> = body
        .split(' ')
        .map(|word| {
            if PROFANE_WORDS.iter().any(|bad| bad.eq_ignore_ascii_case(word)) {
                "****"
            } else {
                word
            }
        })
        .collect();
    Ok(cleaned.join(" "))
}

fn chirp_response(chirp: ChirpRow) -> ChirpResponse {
    ChirpResponse {
        id: chirp.id,
        body: chirp.body,
        author_id: chirp.author_id,
    }
}

#[derive(Debug, Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<u64>,
    #[serde(default)]
    pub sort: SortOrder,
}

pub async fn create_chirp(
    State(state): State<AppState>,
    AuthUser(author_id): AuthUser,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = clean_body(&req.body)?;

    let chirp = blocking(&state, move |s| s.db.create_chirp(&body, author_id)).await?;

    Ok((StatusCode::CREATED, Json(chirp_response(chirp))))
}

pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let chirps = blocking(&state, move |s| s.db.list_chirps(query.author_id, query.sort)).await?;

    Ok(Json(
        chirps.into_iter().map(chirp_response).collect::<Vec<_>>(),
    ))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = blocking(&state, move |s| s.db.get_chirp(chirp_id)).await?;
    Ok(Json(chirp_response(chirp)))
}

pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u64>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| s.db.delete_chirp(chirp_id, user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::test_support::TestApp;

    #[test]
    fn masks_profanity_case_insensitively() {
        assert_eq!(
            clean_body("This is a Kerfuffle opinion I need to share with the world").unwrap(),
            "This is a **** opinion I need to share with the world"
        );
        // Punctuation keeps the word intact.
        assert_eq!(clean_body("Sharbert! fornax").unwrap(), "Sharbert! ****");
    }

    #[test]
    fn length_limit_counts_characters() {
        assert!(clean_body(&"a".repeat(140)).is_ok());
        assert!(clean_body(&"a".repeat(141)).is_err());
        assert!(clean_body(&"é".repeat(140)).is_ok());
    }

    #[tokio::test]
    async fn length_boundary_and_ordering() {
        let app = TestApp::new();
        let (id, access, _) = app.signup("a@b.com", "pw").await;
        let bearer = format!("Bearer {}", access);

        let (status, _) = app
            .send("POST", "/api/chirps", Some(bearer.as_str()), Some(json!({ "body": "b".repeat(141) })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.state.db.with_snapshot(|s| s.chirps.is_empty()).unwrap());

        let (status, first) = app
            .send("POST", "/api/chirps", Some(bearer.as_str()), Some(json!({ "body": "a".repeat(140) })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["author_id"], id);

        app.send("POST", "/api/chirps", Some(bearer.as_str()), Some(json!({ "body": "later" })))
            .await;

        let (status, list) = app.send("GET", "/api/chirps?sort=asc", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let bodies: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["body"].as_str().unwrap())
            .collect();
        assert_eq!(bodies, vec!["a".repeat(140).as_str(), "later"]);

        let (_, list) = app.send("GET", "/api/chirps?sort=desc", None, None).await;
        assert_eq!(list[0]["body"], "later");
    }

    #[tokio::test]
    async fn filter_by_author() {
        let app = TestApp::new();
        let (a, access_a, _) = app.signup("a@b.com", "pw").await;
        let (_, access_b, _) = app.signup("c@d.com", "pw").await;

        for (access, body) in [(&access_a, "from a"), (&access_b, "from b")] {
            let bearer = format!("Bearer {}", access);
            app.send("POST", "/api/chirps", Some(bearer.as_str()), Some(json!({ "body": body })))
                .await;
        }

        let (_, list) = app
            .send("GET", &format!("/api/chirps?author_id={}", a), None, None)
            .await;
        assert_eq!(list, json!([{ "id": 1, "body": "from a", "author_id": a }]));
    }

    #[tokio::test]
    async fn delete_permissions() {
        let app = TestApp::new();
        let (_, access_a, _) = app.signup("a@b.com", "pw").await;
        let (_, access_b, _) = app.signup("c@d.com", "pw").await;
        let bearer_a = format!("Bearer {}", access_a);
        let bearer_b = format!("Bearer {}", access_b);

        app.send("POST", "/api/chirps", Some(bearer_a.as_str()), Some(json!({ "body": "mine" })))
            .await;

        let (status, _) = app.send("DELETE", "/api/chirps/1", Some(bearer_b.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send("GET", "/api/chirps/1", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.send("DELETE", "/api/chirps/1", Some(bearer_a.as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send("GET", "/api/chirps/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send("DELETE", "/api/chirps/1", Some(bearer_b.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = app.send("GET", "/api/chirps", None, None).await;
        assert_eq!(list, json!([]));
    }
}
