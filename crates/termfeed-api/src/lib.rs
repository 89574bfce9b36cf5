pub mod comments;
pub mod conversations;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::error::ApiError;
use termfeed_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

/// Build the full application router. Lives here rather than in the server
/// binary so HTTP-level tests can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/users", post(users::create_user))
        .route("/me", get(users::get_me))
        .route("/settings", get(users::get_settings).put(users::update_settings))
        .route("/timeline", get(posts::get_timeline))
        .route("/discover", get(posts::get_discover))
        .route("/posts", post(posts::create_post))
        .route("/posts/{post_id}/like", post(posts::like_post))
        .route("/posts/{post_id}/repost", post(posts::repost_post))
        .route(
            "/posts/{post_id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/conversations", get(conversations::list_conversations))
        .route("/dm", post(conversations::get_or_create_dm))
        .route(
            "/conversations/{conversation_id}/messages",
            get(conversations::list_messages).post(conversations::send_message),
        )
        .route(
            "/conversations/{conversation_id}/read",
            post(conversations::mark_read),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/{notification_id}/read",
            post(notifications::mark_read),
        )
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "termfeed API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "termfeed API" }))
}

/// Run synchronous DB work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed"))
    })?
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Try RFC 3339 first, then parse as naive UTC.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_datetime_format() {
        let ts = parse_timestamp("2026-08-25 14:30:00");
        assert_eq!(ts.year(), 2026);
        assert_eq!(ts.hour(), 14);
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2026-08-25T14:30:00Z");
        assert_eq!(ts.minute(), 30);
    }
}
