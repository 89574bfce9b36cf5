use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use termfeed_types::api::{NotificationResponse, SuccessResponse};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::{AppState, parse_timestamp, run_blocking};

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let user_id = identity.user_id;
    let rows = run_blocking(move || {
        state
            .db
            .notifications_for_user(user_id, query.unread)
            .map_err(ApiError::from)
    })
    .await?;

    let notifications = rows
        .into_iter()
        .map(|row| {
            let created_at = parse_timestamp(&row.created_at);
            NotificationResponse {
                id: row.id,
                kind: row.kind,
                actor: row.actor_handle.clone(),
                username: row.actor_handle,
                content: row.content,
                timestamp: created_at,
                created_at,
                read: row.read,
                post_id: row.post_id,
            }
        })
        .collect();

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let found = run_blocking(move || {
        state
            .db
            .mark_notification_read(notification_id)
            .map_err(ApiError::from)
    })
    .await?;

    if !found {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(SuccessResponse { success: true }))
}
