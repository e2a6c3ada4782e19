use std::sync::atomic::Ordering;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use crate::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Counts every request that reaches the static file server.
pub async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        hits
    ))
}

pub async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.fileserver_hits.store(0, Ordering::Relaxed);
    info!("File server hit counter reset");
    StatusCode::OK
}
