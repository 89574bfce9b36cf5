use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use termfeed_types::api::{CommentCreate, CommentResponse};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::{AppState, run_blocking};

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let rows = run_blocking(move || {
        state
            .db
            .get_post_by_id(post_id)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;
        state.db.comments_for_post(post_id).map_err(ApiError::from)
    })
    .await?;

    let comments = rows
        .into_iter()
        .map(|c| CommentResponse {
            user: c.username,
            text: c.text,
        })
        .collect();

    Ok(Json(comments))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: Identity,
    Json(req): Json<CommentCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::validation("comment text must not be empty"));
    }

    let user_id = identity.user_id;
    let handle = identity.handle.clone();
    let comment = run_blocking(move || {
        state
            .db
            .add_comment(post_id, user_id, &handle, &req.text)
            .map_err(ApiError::from)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            user: comment.username,
            text: comment.text,
        }),
    ))
}
