use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            display_name    TEXT NOT NULL,
            bio             TEXT NOT NULL DEFAULT '',
            followers       INTEGER NOT NULL DEFAULT 0,
            following       INTEGER NOT NULL DEFAULT 0,
            posts_count     INTEGER NOT NULL DEFAULT 0,
            ascii_pic       TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS user_settings (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             INTEGER NOT NULL UNIQUE
                                REFERENCES users(id) ON DELETE CASCADE,
            email_notifications INTEGER NOT NULL DEFAULT 1,
            show_online_status  INTEGER NOT NULL DEFAULT 1,
            private_account     INTEGER NOT NULL DEFAULT 0,
            github_connected    INTEGER NOT NULL DEFAULT 0,
            gitlab_connected    INTEGER NOT NULL DEFAULT 0,
            google_connected    INTEGER NOT NULL DEFAULT 0,
            discord_connected   INTEGER NOT NULL DEFAULT 0,
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id       INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
            author_handle   TEXT NOT NULL,
            content         TEXT NOT NULL,
            likes_count     INTEGER NOT NULL DEFAULT 0,
            reposts_count   INTEGER NOT NULL DEFAULT 0,
            comments_count  INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_posts_created
            ON posts(created_at DESC);

        CREATE TABLE IF NOT EXISTS post_interactions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL
                        REFERENCES posts(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL
                        REFERENCES users(id) ON DELETE CASCADE,
            kind        TEXT NOT NULL CHECK (kind IN ('like', 'repost')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(post_id, user_id, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_post
            ON post_interactions(post_id);
        CREATE INDEX IF NOT EXISTS idx_interactions_user
            ON post_interactions(user_id);

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL
                        REFERENCES posts(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL
                        REFERENCES users(id) ON DELETE CASCADE,
            username    TEXT NOT NULL,
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        -- Unordered pair stored canonically: the lower user id is always
        -- participant_a, so one row represents the pair in either order.
        CREATE TABLE IF NOT EXISTS conversations (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            participant_a_id     INTEGER NOT NULL
                                 REFERENCES users(id) ON DELETE CASCADE,
            participant_b_id     INTEGER NOT NULL
                                 REFERENCES users(id) ON DELETE CASCADE,
            last_message_preview TEXT NOT NULL DEFAULT '',
            last_message_at      TEXT NOT NULL DEFAULT (datetime('now')),
            created_at           TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(participant_a_id, participant_b_id),
            CHECK (participant_a_id < participant_b_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL
                            REFERENCES conversations(id) ON DELETE CASCADE,
            sender_id       INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
            sender_handle   TEXT NOT NULL,
            content         TEXT NOT NULL,
            is_read         INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, created_at);

        CREATE TABLE IF NOT EXISTS notifications (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL
                         REFERENCES users(id) ON DELETE CASCADE,
            kind         TEXT NOT NULL CHECK
                         (kind IN ('mention', 'like', 'repost', 'follow', 'comment')),
            actor_id     INTEGER NOT NULL
                         REFERENCES users(id) ON DELETE CASCADE,
            actor_handle TEXT NOT NULL,
            content      TEXT NOT NULL,
            post_id      INTEGER
                         REFERENCES posts(id) ON DELETE CASCADE,
            read         INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, read);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
