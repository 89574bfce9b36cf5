//! One-shot loader for the demo dataset.
//!
//! Usage: TERMFEED_DB_PATH=termfeed.db termfeed-seed

use std::path::PathBuf;

use tracing::info;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "termfeed=info".into()),
        )
        .init();

    let db_path = std::env::var("TERMFEED_DB_PATH").unwrap_or_else(|_| "termfeed.db".into());
    let db = termfeed_db::Database::open(&PathBuf::from(&db_path))?;

    if termfeed_db::seed::load_demo_data(&db)? {
        info!("Demo data loaded into {}", db_path);
    } else {
        info!("Database {} already seeded, nothing to do", db_path);
    }

    Ok(())
}
