use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use termfeed_db::models::UserRow;
use termfeed_db::queries::is_constraint_violation;
use termfeed_types::api::{
    SettingsResponse, SettingsUpdate, SuccessResponse, UserCreate, UserResponse,
};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::{AppState, run_blocking};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.username.len() > 50 {
        return Err(ApiError::validation("username must be 1..=50 characters"));
    }
    if req.display_name.is_empty() || req.display_name.len() > 100 {
        return Err(ApiError::validation("display_name must be 1..=100 characters"));
    }

    let user = run_blocking(move || {
        state
            .db
            .create_user(&req.username, &req.display_name, &req.bio, &req.ascii_pic)
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::conflict("username already taken")
                } else {
                    ApiError::Internal(e)
                }
            })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user_response(user))))
}

pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = identity.user_id;
    let user = run_blocking(move || state.db.get_user_by_id(user_id).map_err(ApiError::from))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", identity.handle)))?;

    Ok(Json(user_response(user)))
}

pub async fn get_settings(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<SettingsResponse>, ApiError> {
    let user_id = identity.user_id;
    let (user, settings) = run_blocking(move || {
        let user = state
            .db
            .get_user_by_id(user_id)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let settings = state.db.get_settings(user_id).map_err(ApiError::from)?;
        Ok((user, settings))
    })
    .await?;

    // A missing settings row falls back to the defaults.
    let response = match settings {
        Some(s) => SettingsResponse {
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            email_notifications: s.email_notifications,
            show_online_status: s.show_online_status,
            private_account: s.private_account,
            github_connected: s.github_connected,
            gitlab_connected: s.gitlab_connected,
            google_connected: s.google_connected,
            discord_connected: s.discord_connected,
            ascii_pic: user.ascii_pic,
        },
        None => SettingsResponse {
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            email_notifications: true,
            show_online_status: true,
            private_account: false,
            github_connected: false,
            gitlab_connected: false,
            google_connected: false,
            discord_connected: false,
            ascii_pic: user.ascii_pic,
        },
    };

    Ok(Json(response))
}

pub async fn update_settings(
    State(state): State<AppState>,
    identity: Identity,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if let Some(username) = &update.username {
        if username.is_empty() || username.len() > 50 {
            return Err(ApiError::validation("username must be 1..=50 characters"));
        }
    }

    let user_id = identity.user_id;
    run_blocking(move || {
        state.db.update_settings(user_id, &update).map_err(|e| {
            if is_constraint_violation(&e) {
                ApiError::conflict("username already taken")
            } else {
                ApiError::Internal(e)
            }
        })
    })
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}

pub(crate) fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        handle: user.username.clone(),
        username: user.username,
        display_name: user.display_name,
        bio: user.bio,
        followers: user.followers,
        following: user.following,
        posts_count: user.posts_count,
        ascii_pic: user.ascii_pic,
    }
}
