use std::collections::{HashMap, HashSet};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use termfeed_db::models::{ConversationRow, MessageRow};
use termfeed_types::api::{
    ConversationCreate, ConversationResponse, MessageCreate, MessageResponse, SuccessResponse,
};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::{AppState, parse_timestamp, run_blocking};

pub async fn list_conversations(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<ConversationResponse>>, ApiError> {
    let user_id = identity.user_id;

    let (rows, handles, unread_ids) = run_blocking(move || {
        let rows = state
            .db
            .conversations_for_user(user_id)
            .map_err(ApiError::from)?;

        let mut participant_ids: Vec<i64> = rows
            .iter()
            .flat_map(|c| [c.participant_a_id, c.participant_b_id])
            .collect();
        participant_ids.sort_unstable();
        participant_ids.dedup();

        let handles = state
            .db
            .usernames_for_ids(&participant_ids)
            .map_err(ApiError::from)?;
        let unread_ids = state
            .db
            .unread_conversation_ids(user_id)
            .map_err(ApiError::from)?;

        Ok((rows, handles, unread_ids))
    })
    .await?;

    let handle_map: HashMap<i64, String> = handles.into_iter().collect();
    let unread: HashSet<i64> = unread_ids.into_iter().collect();

    let conversations = rows
        .into_iter()
        .map(|row| {
            let unread = unread.contains(&row.id);
            conversation_response(row, &handle_map, unread)
        })
        .collect();

    Ok(Json(conversations))
}

pub async fn get_or_create_dm(
    State(state): State<AppState>,
    Json(req): Json<ConversationCreate>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let (row, a_handle, b_handle) = run_blocking(move || {
        let user_a = state
            .db
            .get_user_by_username(&req.user_a_handle)
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                ApiError::not_found(format!("User '{}' not found", req.user_a_handle))
            })?;
        let user_b = state
            .db
            .get_user_by_username(&req.user_b_handle)
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                ApiError::not_found(format!("User '{}' not found", req.user_b_handle))
            })?;

        if user_a.id == user_b.id {
            return Err(ApiError::validation("cannot open a conversation with yourself"));
        }

        let row = state
            .db
            .get_or_create_conversation(user_a.id, user_b.id)
            .map_err(ApiError::from)?;

        Ok((row, user_a.username, user_b.username))
    })
    .await?;

    Ok(Json(ConversationResponse {
        id: row.id,
        participant_handles: vec![a_handle, b_handle],
        last_message_preview: row.last_message_preview,
        last_message_at: parse_timestamp(&row.last_message_at),
        unread: false,
    }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let rows = run_blocking(move || {
        state
            .db
            .get_conversation_by_id(conversation_id)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("Conversation not found"))?;
        state
            .db
            .messages_for_conversation(conversation_id)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(rows.into_iter().map(message_response).collect()))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
    Json(req): Json<MessageCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::validation("message content must not be empty"));
    }

    let row = run_blocking(move || {
        let sender = state
            .db
            .get_user_by_username(&req.sender_handle)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("Sender not found"))?;

        state
            .db
            .create_message(conversation_id, sender.id, &sender.username, &req.content)
            .map_err(ApiError::from)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Conversation not found"))?;

    Ok((StatusCode::CREATED, Json(message_response(row))))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
    identity: Identity,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user_id = identity.user_id;
    run_blocking(move || {
        state
            .db
            .get_conversation_by_id(conversation_id)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("Conversation not found"))?;
        state
            .db
            .mark_conversation_read(conversation_id, user_id)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}

fn conversation_response(
    row: ConversationRow,
    handle_map: &HashMap<i64, String>,
    unread: bool,
) -> ConversationResponse {
    let participant_handles = [row.participant_a_id, row.participant_b_id]
        .iter()
        .filter_map(|id| handle_map.get(id).cloned())
        .collect();

    ConversationResponse {
        id: row.id,
        participant_handles,
        last_message_preview: row.last_message_preview,
        last_message_at: parse_timestamp(&row.last_message_at),
        unread,
    }
}

fn message_response(row: MessageRow) -> MessageResponse {
    let created_at = parse_timestamp(&row.created_at);
    MessageResponse {
        id: row.id,
        sender_id: row.sender_id,
        content: row.content,
        timestamp: created_at,
        created_at,
        is_read: row.is_read,
    }
}
