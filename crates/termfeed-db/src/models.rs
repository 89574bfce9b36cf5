//! Database row types, mapping directly to SQLite rows.
//! Distinct from the termfeed-types API models to keep the DB layer
//! independent. Timestamps stay as the TEXT SQLite produced; the API layer
//! parses them once, at the boundary.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub followers: i64,
    pub following: i64,
    pub posts_count: i64,
    pub ascii_pic: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct UserSettingsRow {
    pub user_id: i64,
    pub email_notifications: bool,
    pub show_online_status: bool,
    pub private_account: bool,
    pub github_connected: bool,
    pub gitlab_connected: bool,
    pub google_connected: bool,
    pub discord_connected: bool,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub author_handle: String,
    pub content: String,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub comments_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct InteractionRow {
    pub post_id: i64,
    pub user_id: i64,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub id: i64,
    pub participant_a_id: i64,
    pub participant_b_id: i64,
    pub last_message_preview: String,
    pub last_message_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_handle: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub actor_id: i64,
    pub actor_handle: String,
    pub content: String,
    pub post_id: Option<i64>,
    pub read: bool,
    pub created_at: String,
}
