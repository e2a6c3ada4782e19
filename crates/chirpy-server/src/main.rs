mod cleanup;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use chirpy_api::{AppState, AppStateInner};
use chirpy_db::Database;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chirpy_server=debug,chirpy_api=debug,chirpy_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: JWT_SECRET is unset or still a placeholder.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }
    let polka_key = std::env::var("POLKA_API_KEY").unwrap_or_default();
    if polka_key.is_empty() {
        warn!("POLKA_API_KEY is unset; payment webhooks will be rejected");
    }

    let db_path: PathBuf = std::env::var("CHIRPY_DB_PATH")
        .unwrap_or_else(|_| "database.json".into())
        .into();
    let static_root: PathBuf = std::env::var("CHIRPY_FILESERVER_ROOT")
        .unwrap_or_else(|_| ".".into())
        .into();
    let host = std::env::var("CHIRPY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CHIRPY_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let debug = std::env::var("CHIRPY_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let sweep_secs: u64 = std::env::var("CHIRPY_TOKEN_SWEEP_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(3600);

    // Init store
    if debug {
        warn!("Debug mode: starting from an empty store");
        chirpy_db::backend::remove(&db_path)?;
    }
    let db = Database::open(&db_path)?;

    let state: AppState = Arc::new(AppStateInner::new(db, &jwt_secret, polka_key));

    tokio::spawn(cleanup::run_token_sweep(state.clone(), sweep_secs));

    let app = chirpy_api::router(state, &static_root).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Chirpy listening on {}", addr);
    info!("Serving files from {} under /app", static_root.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Could not install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
