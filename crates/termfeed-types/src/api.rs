use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCreate {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub ascii_pic: String,
}

/// Profile response. `handle` mirrors `username`; the terminal client reads
/// both spellings, so both are kept on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub handle: String,
    pub display_name: String,
    pub bio: String,
    pub followers: i64,
    pub following: i64,
    pub posts_count: i64,
    pub ascii_pic: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostCreate {
    pub content: String,
}

/// Post as shaped for feeds. Counter and timestamp fields are duplicated
/// under their legacy names (`likes`/`likes_count`, `timestamp`/`created_at`)
/// to preserve the existing wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub author: String,
    pub author_handle: String,
    pub author_id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub likes_count: i64,
    pub reposts: i64,
    pub reposts_count: i64,
    pub comments: i64,
    pub comments_count: i64,
    pub liked_by_user: bool,
    pub reposted_by_user: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    /// True when the toggle left the interaction present (liked/reposted),
    /// false when it removed it.
    pub active: bool,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentCreate {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub user: String,
    pub text: String,
}

// -- Conversations & messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationCreate {
    pub user_a_handle: String,
    pub user_b_handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: i64,
    pub participant_handles: Vec<String>,
    pub last_message_preview: String,
    pub last_message_at: DateTime<Utc>,
    pub unread: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageCreate {
    pub content: String,
    pub sender_handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub sender_id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: String,
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub post_id: Option<i64>,
}

// -- Settings --

/// Partial update: only the fields present in the request body are applied.
/// Profile fields (username, display_name, bio, ascii_pic) live on the user
/// row; the rest live on user_settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub email_notifications: Option<bool>,
    pub show_online_status: Option<bool>,
    pub private_account: Option<bool>,
    pub ascii_pic: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub email_notifications: bool,
    pub show_online_status: bool,
    pub private_account: bool,
    pub github_connected: bool,
    pub gitlab_connected: bool,
    pub google_connected: bool,
    pub discord_connected: bool,
    pub ascii_pic: String,
}

// -- Misc --

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
