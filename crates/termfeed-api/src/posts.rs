use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use termfeed_db::models::PostRow;
use termfeed_types::api::{PostCreate, PostResponse, ToggleResponse};
use termfeed_types::models::InteractionKind;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::{AppState, parse_timestamp, run_blocking};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

impl FeedQuery {
    fn clamped_limit(&self) -> u32 {
        self.limit.clamp(1, 100)
    }
}

pub async fn get_timeline(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let limit = query.clamped_limit();
    let offset = query.offset;
    let user_id = identity.user_id;

    let (rows, interactions) = run_blocking(move || {
        let rows = state.db.timeline_posts(limit, offset).map_err(ApiError::from)?;
        let post_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let interactions = state
            .db
            .interactions_for_posts(&post_ids, user_id)
            .map_err(ApiError::from)?;
        Ok((rows, interactions))
    })
    .await?;

    Ok(Json(shape_feed(rows, &interactions)))
}

pub async fn get_discover(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let limit = query.clamped_limit();
    let user_id = identity.user_id;

    let (rows, interactions) = run_blocking(move || {
        let rows = state.db.discover_posts(limit).map_err(ApiError::from)?;
        let post_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let interactions = state
            .db
            .interactions_for_posts(&post_ids, user_id)
            .map_err(ApiError::from)?;
        Ok((rows, interactions))
    })
    .await?;

    Ok(Json(shape_feed(rows, &interactions)))
}

pub async fn create_post(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<PostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::validation("post content must not be empty"));
    }

    let user_id = identity.user_id;
    let handle = identity.handle.clone();
    let row = run_blocking(move || {
        state
            .db
            .create_post(user_id, &handle, &req.content)
            .map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(post_response(row, false, false))))
}

pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: Identity,
) -> Result<Json<ToggleResponse>, ApiError> {
    toggle(state, post_id, identity, InteractionKind::Like).await
}

pub async fn repost_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    identity: Identity,
) -> Result<Json<ToggleResponse>, ApiError> {
    toggle(state, post_id, identity, InteractionKind::Repost).await
}

async fn toggle(
    state: AppState,
    post_id: i64,
    identity: Identity,
    kind: InteractionKind,
) -> Result<Json<ToggleResponse>, ApiError> {
    let user_id = identity.user_id;
    let active = run_blocking(move || {
        state
            .db
            .toggle_interaction(post_id, user_id, kind)
            .map_err(ApiError::from)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(ToggleResponse {
        success: true,
        active,
    }))
}

/// Annotate feed rows with the acting user's like/repost state.
fn shape_feed(
    rows: Vec<PostRow>,
    interactions: &[termfeed_db::models::InteractionRow],
) -> Vec<PostResponse> {
    let liked: HashSet<i64> = interactions
        .iter()
        .filter(|r| r.kind == InteractionKind::Like.as_str())
        .map(|r| r.post_id)
        .collect();
    let reposted: HashSet<i64> = interactions
        .iter()
        .filter(|r| r.kind == InteractionKind::Repost.as_str())
        .map(|r| r.post_id)
        .collect();

    rows.into_iter()
        .map(|row| {
            let is_liked = liked.contains(&row.id);
            let is_reposted = reposted.contains(&row.id);
            post_response(row, is_liked, is_reposted)
        })
        .collect()
}

pub(crate) fn post_response(row: PostRow, liked: bool, reposted: bool) -> PostResponse {
    let created_at = parse_timestamp(&row.created_at);
    PostResponse {
        id: row.id,
        author: row.author_handle.clone(),
        author_handle: row.author_handle,
        author_id: row.author_id,
        content: row.content,
        timestamp: created_at,
        created_at,
        likes: row.likes_count,
        likes_count: row.likes_count,
        reposts: row.reposts_count,
        reposts_count: row.reposts_count,
        comments: row.comments_count,
        comments_count: row.comments_count,
        liked_by_user: liked,
        reposted_by_user: reposted,
    }
}
