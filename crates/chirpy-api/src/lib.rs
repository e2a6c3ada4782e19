pub mod admin;
pub mod auth;
pub mod chirps;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod tokens;
pub mod users;
pub mod webhooks;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::error;

use chirpy_db::Database;

use crate::error::ApiError;
use crate::tokens::TokenSigner;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub signer: TokenSigner,
    pub polka_key: String,
    pub fileserver_hits: AtomicUsize,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: &str, polka_key: String) -> Self {
        Self {
            db,
            signer: TokenSigner::new(jwt_secret),
            polka_key,
            fileserver_hits: AtomicUsize::new(0),
        }
    }
}

/// All routes; static files under `/app` are served from `static_root`.
pub fn router(state: AppState, static_root: &Path) -> Router {
    let app_files = Router::new()
        .nest_service("/app", ServeDir::new(static_root))
        .route_layer(from_fn_with_state(state.clone(), admin::count_hits));

    Router::new()
        .route("/api/healthz", get(admin::healthz))
        .route("/api/users", post(users::create_user).put(users::update_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", post(chirps::create_chirp).get(chirps::list_chirps))
        .route(
            "/api/chirps/{chirp_id}",
            get(chirps::get_chirp).delete(chirps::delete_chirp),
        )
        .route("/api/polka/webhooks", post(webhooks::polka))
        .route("/admin/metrics", get(admin::metrics))
        .route("/api/reset", get(admin::reset))
        .merge(app_files)
        .with_state(state)
}

/// Run store work off the async runtime.
pub(crate) async fn blocking<F, T, E>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal()
        })?
        .map_err(Into::into)
}
