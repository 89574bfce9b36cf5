use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use termfeed_api::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "termfeed=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("TERMFEED_DB_PATH").unwrap_or_else(|_| "termfeed.db".into());
    let host = std::env::var("TERMFEED_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TERMFEED_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;

    // Init database
    let db = termfeed_db::Database::open(&PathBuf::from(&db_path))?;

    let state: AppState = Arc::new(AppStateInner { db });

    let app = termfeed_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("termfeed server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
