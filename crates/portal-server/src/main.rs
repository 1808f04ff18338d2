mod cleanup;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use portal_api::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portal_server=debug,portal_api=debug,portal_db=info,tower_http=info".into()
            }),
        )
        .init();

    // Config
    let password = std::env::var("PORTAL_PASSWORD").unwrap_or_default();
    if password.is_empty() {
        eprintln!("FATAL: PORTAL_PASSWORD environment variable is not set.");
        eprintln!("       Set it in your environment or .env file and restart.");
        std::process::exit(1);
    }

    let host = std::env::var("PORTAL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PORTAL_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("PORTAL_DB_PATH")
        .unwrap_or_else(|_| "team-portal.db".into())
        .into();

    // Init database
    let db = portal_db::Database::open(&db_path)?;

    let state: AppState = Arc::new(AppStateInner::new(db, password));

    // Hourly retention sweep for the updates collection
    tokio::spawn(cleanup::run_retention_loop(state.clone(), 3600));

    let app = portal_api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Team portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // connect-info is required: the login guard keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
