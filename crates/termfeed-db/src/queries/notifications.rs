use crate::Database;
use crate::models::NotificationRow;
use crate::queries::posts::insert_notification;
use anyhow::Result;
use termfeed_types::models::NotificationKind;

impl Database {
    pub fn create_notification(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        actor_id: i64,
        content: &str,
        post_id: Option<i64>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            insert_notification(conn, recipient_id, kind.as_str(), actor_id, content, post_id)
        })
    }

    pub fn notifications_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let sql = if unread_only {
                "SELECT id, user_id, kind, actor_id, actor_handle, content,
                        post_id, read, created_at
                 FROM notifications
                 WHERE user_id = ?1 AND read = 0
                 ORDER BY created_at DESC, id DESC"
            } else {
                "SELECT id, user_id, kind, actor_id, actor_handle, content,
                        post_id, read, created_at
                 FROM notifications
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            };

            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        kind: row.get(2)?,
                        actor_id: row.get(3)?,
                        actor_handle: row.get(4)?,
                        content: row.get(5)?,
                        post_id: row.get(6)?,
                        read: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns false when the notification is unknown.
    pub fn mark_notification_read(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("UPDATE notifications SET read = 1 WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}
