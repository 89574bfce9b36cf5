use crate::Database;
use crate::models::{UserRow, UserSettingsRow};
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::Connection;
use termfeed_types::api::SettingsUpdate;

impl Database {
    // -- Users --

    /// Insert a user together with its default settings row (1:1).
    pub fn create_user(
        &self,
        username: &str,
        display_name: &str,
        bio: &str,
        ascii_pic: &str,
    ) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO users (username, display_name, bio, ascii_pic)
                 VALUES (?1, ?2, ?3, ?4)",
                (username, display_name, bio, ascii_pic),
            )?;
            let user_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO user_settings (user_id) VALUES (?1)",
                [user_id],
            )?;

            let row = query_user_by_id(&tx, user_id)?
                .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", user_id))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Batch-fetch usernames for a set of user ids.
    pub fn usernames_for_ids(&self, ids: &[i64]) -> Result<Vec<(i64, String)>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, username FROM users WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> =
                ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Cascades to settings, posts, comments, interactions, conversations,
    /// messages and notifications. Returns false when the user is unknown.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Settings --

    pub fn get_settings(&self, user_id: i64) -> Result<Option<UserSettingsRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, email_notifications, show_online_status,
                        private_account, github_connected, gitlab_connected,
                        google_connected, discord_connected
                 FROM user_settings WHERE user_id = ?1",
            )?;

            let row = stmt
                .query_row([user_id], |row| {
                    Ok(UserSettingsRow {
                        user_id: row.get(0)?,
                        email_notifications: row.get(1)?,
                        show_online_status: row.get(2)?,
                        private_account: row.get(3)?,
                        github_connected: row.get(4)?,
                        gitlab_connected: row.get(5)?,
                        google_connected: row.get(6)?,
                        discord_connected: row.get(7)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    /// Partial update of profile fields and settings flags, one transaction.
    /// Creates the settings row if it is missing.
    pub fn update_settings(&self, user_id: i64, update: &SettingsUpdate) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if let Some(username) = &update.username {
                tx.execute(
                    "UPDATE users SET username = ?1 WHERE id = ?2",
                    (username, user_id),
                )?;
            }
            if let Some(display_name) = &update.display_name {
                tx.execute(
                    "UPDATE users SET display_name = ?1 WHERE id = ?2",
                    (display_name, user_id),
                )?;
            }
            if let Some(bio) = &update.bio {
                tx.execute("UPDATE users SET bio = ?1 WHERE id = ?2", (bio, user_id))?;
            }
            if let Some(ascii_pic) = &update.ascii_pic {
                tx.execute(
                    "UPDATE users SET ascii_pic = ?1 WHERE id = ?2",
                    (ascii_pic, user_id),
                )?;
            }

            tx.execute(
                "INSERT INTO user_settings (user_id) VALUES (?1)
                 ON CONFLICT(user_id) DO NOTHING",
                [user_id],
            )?;

            if let Some(v) = update.email_notifications {
                set_flag(&tx, user_id, "email_notifications", v)?;
            }
            if let Some(v) = update.show_online_status {
                set_flag(&tx, user_id, "show_online_status", v)?;
            }
            if let Some(v) = update.private_account {
                set_flag(&tx, user_id, "private_account", v)?;
            }

            tx.commit()?;
            Ok(())
        })
    }
}

fn set_flag(conn: &Connection, user_id: i64, column: &str, value: bool) -> Result<()> {
    // Column names come from the fixed list above, never from input.
    let sql = format!(
        "UPDATE user_settings
         SET {column} = ?1, updated_at = datetime('now')
         WHERE user_id = ?2"
    );
    conn.execute(&sql, (value, user_id))?;
    Ok(())
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, display_name, bio, followers, following,
                posts_count, ascii_pic, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], map_user).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, display_name, bio, followers, following,
                posts_count, ascii_pic, created_at
         FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        bio: row.get(3)?,
        followers: row.get(4)?,
        following: row.get(5)?,
        posts_count: row.get(6)?,
        ascii_pic: row.get(7)?,
        created_at: row.get(8)?,
    })
}
