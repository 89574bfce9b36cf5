use crate::Database;
use crate::models::{ConversationRow, MessageRow};
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::Connection;

/// Longest preview stored on a conversation row, in characters.
const PREVIEW_LEN: usize = 50;

impl Database {
    // -- Conversations --

    pub fn conversations_for_user(&self, user_id: i64) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, participant_a_id, participant_b_id,
                        last_message_preview, last_message_at, created_at
                 FROM conversations
                 WHERE participant_a_id = ?1 OR participant_b_id = ?1
                 ORDER BY last_message_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([user_id], map_conversation)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_conversation_by_id(&self, id: i64) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| query_conversation_by_id(conn, id))
    }

    /// Get or create the conversation for an unordered pair of users. The
    /// pair is canonicalized (lower id first) before lookup, matching the
    /// CHECK constraint, so both argument orders resolve to the same row.
    /// Insert-then-reselect keeps a concurrent create from producing a
    /// duplicate: the second insert is a no-op on the UNIQUE pair.
    pub fn get_or_create_conversation(
        &self,
        user_a_id: i64,
        user_b_id: i64,
    ) -> Result<ConversationRow> {
        let (min_id, max_id) = if user_a_id < user_b_id {
            (user_a_id, user_b_id)
        } else {
            (user_b_id, user_a_id)
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (participant_a_id, participant_b_id)
                 VALUES (?1, ?2)
                 ON CONFLICT(participant_a_id, participant_b_id) DO NOTHING",
                (min_id, max_id),
            )?;

            let row = conn
                .query_row(
                    "SELECT id, participant_a_id, participant_b_id,
                            last_message_preview, last_message_at, created_at
                     FROM conversations
                     WHERE participant_a_id = ?1 AND participant_b_id = ?2",
                    (min_id, max_id),
                    map_conversation,
                )?;

            Ok(row)
        })
    }

    /// Conversation ids with at least one message the user has not read yet.
    pub fn unread_conversation_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT m.conversation_id
                 FROM messages m
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE m.is_read = 0
                   AND m.sender_id != ?1
                   AND (c.participant_a_id = ?1 OR c.participant_b_id = ?1)",
            )?;

            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;

            Ok(ids)
        })
    }

    // -- Messages --

    pub fn messages_for_conversation(&self, conversation_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, sender_handle,
                        content, is_read, created_at
                 FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at, id",
            )?;

            let rows = stmt
                .query_map([conversation_id], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Insert a message and refresh the conversation's preview and
    /// last_message_at in one transaction. Returns None when the
    /// conversation is unknown.
    pub fn create_message(
        &self,
        conversation_id: i64,
        sender_id: i64,
        sender_handle: &str,
        content: &str,
    ) -> Result<Option<MessageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM conversations WHERE id = ?1",
                    [conversation_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO messages (conversation_id, sender_id, sender_handle, content)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![conversation_id, sender_id, sender_handle, content],
            )?;
            let message_id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE conversations
                 SET last_message_preview = ?1,
                     last_message_at = (SELECT created_at FROM messages WHERE id = ?2)
                 WHERE id = ?3",
                rusqlite::params![preview_of(content), message_id, conversation_id],
            )?;

            let row = tx.query_row(
                "SELECT id, conversation_id, sender_id, sender_handle,
                        content, is_read, created_at
                 FROM messages WHERE id = ?1",
                [message_id],
                map_message,
            )?;

            tx.commit()?;
            Ok(Some(row))
        })
    }

    /// Mark everything the other participant sent in this conversation as
    /// read. Returns the number of messages affected.
    pub fn mark_conversation_read(&self, conversation_id: i64, reader_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE messages SET is_read = 1
                 WHERE conversation_id = ?1 AND sender_id != ?2 AND is_read = 0",
                (conversation_id, reader_id),
            )?;
            Ok(affected)
        })
    }
}

/// First PREVIEW_LEN characters, with an ellipsis when truncated.
/// Char-based so multi-byte content never splits.
fn preview_of(content: &str) -> String {
    if content.chars().count() > PREVIEW_LEN {
        let truncated: String = content.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}...")
    } else {
        content.to_string()
    }
}

fn query_conversation_by_id(conn: &Connection, id: i64) -> Result<Option<ConversationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, participant_a_id, participant_b_id,
                last_message_preview, last_message_at, created_at
         FROM conversations WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_conversation).optional()?;
    Ok(row)
}

fn map_conversation(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<ConversationRow, rusqlite::Error> {
    Ok(ConversationRow {
        id: row.get(0)?,
        participant_a_id: row.get(1)?,
        participant_b_id: row.get(2)?,
        last_message_preview: row.get(3)?,
        last_message_at: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_message(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        sender_handle: row.get(3)?,
        content: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::preview_of;

    #[test]
    fn preview_keeps_short_content() {
        assert_eq!(preview_of("hello"), "hello");
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(80);
        let preview = preview_of(&long);
        assert_eq!(preview.chars().count(), 53);
        assert!(preview.ends_with("..."));
    }
}
