use crate::Database;
use crate::models::{CommentRow, InteractionRow, PostRow};
use crate::queries::{OptionalExt, is_constraint_violation_raw};
use anyhow::Result;
use rusqlite::Connection;
use termfeed_types::models::InteractionKind;

impl Database {
    // -- Posts --

    /// Insert a post and bump the author's posts_count in one transaction.
    pub fn create_post(
        &self,
        author_id: i64,
        author_handle: &str,
        content: &str,
    ) -> Result<PostRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO posts (author_id, author_handle, content)
                 VALUES (?1, ?2, ?3)",
                (author_id, author_handle, content),
            )?;
            let post_id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE users SET posts_count = posts_count + 1 WHERE id = ?1",
                [author_id],
            )?;

            let row = query_post_by_id(&tx, post_id)?
                .ok_or_else(|| anyhow::anyhow!("post {} vanished after insert", post_id))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_post_by_id(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post_by_id(conn, id))
    }

    /// Recent posts from all users, newest first. Creation timestamps have
    /// second resolution, so the id breaks ties to keep the order strict.
    pub fn timeline_posts(&self, limit: u32, offset: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author_id, author_handle, content, likes_count,
                        reposts_count, comments_count, created_at
                 FROM posts
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let rows = stmt
                .query_map([limit, offset], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Posts ordered by total engagement (likes + reposts + comments).
    pub fn discover_posts(&self, limit: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author_id, author_handle, content, likes_count,
                        reposts_count, comments_count, created_at
                 FROM posts
                 ORDER BY likes_count + reposts_count + comments_count DESC,
                          created_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Interactions --

    /// Toggle a like/repost: removes the row and decrements the counter if it
    /// exists, inserts and increments otherwise. The row mutation, the counter
    /// update and the author notification all commit atomically.
    ///
    /// Returns None when the post is unknown, otherwise Some(active) where
    /// active means the interaction is present after the call. A duplicate
    /// insert racing past the existence check trips the UNIQUE constraint and
    /// is reported as already active rather than an error.
    pub fn toggle_interaction(
        &self,
        post_id: i64,
        user_id: i64,
        kind: InteractionKind,
    ) -> Result<Option<bool>> {
        let counter = match kind {
            InteractionKind::Like => "likes_count",
            InteractionKind::Repost => "reposts_count",
        };

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let author_id: Option<i64> = tx
                .query_row("SELECT author_id FROM posts WHERE id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(author_id) = author_id else {
                return Ok(None);
            };

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM post_interactions
                     WHERE post_id = ?1 AND user_id = ?2 AND kind = ?3",
                    rusqlite::params![post_id, user_id, kind.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            let active = if let Some(existing_id) = existing {
                tx.execute("DELETE FROM post_interactions WHERE id = ?1", [existing_id])?;
                tx.execute(
                    &format!(
                        "UPDATE posts SET {counter} = MAX({counter} - 1, 0) WHERE id = ?1"
                    ),
                    [post_id],
                )?;
                false
            } else {
                let inserted = tx.execute(
                    "INSERT INTO post_interactions (post_id, user_id, kind)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![post_id, user_id, kind.as_str()],
                );

                match inserted {
                    Err(ref e) if is_constraint_violation_raw(e) => {
                        // Lost a toggle race: the row is already there.
                        tx.commit()?;
                        return Ok(Some(true));
                    }
                    other => {
                        other?;
                    }
                }

                tx.execute(
                    &format!("UPDATE posts SET {counter} = {counter} + 1 WHERE id = ?1"),
                    [post_id],
                )?;

                if author_id != user_id {
                    let verb = match kind {
                        InteractionKind::Like => "liked your post",
                        InteractionKind::Repost => "reposted your post",
                    };
                    insert_notification(&tx, author_id, kind.as_str(), user_id, verb, Some(post_id))?;
                }
                true
            };

            tx.commit()?;
            Ok(Some(active))
        })
    }

    /// Batch-fetch the acting user's interaction rows for a set of posts, so
    /// feed shaping does not issue a query per post.
    pub fn interactions_for_posts(
        &self,
        post_ids: &[i64],
        user_id: i64,
    ) -> Result<Vec<InteractionRow>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (2..=post_ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT post_id, user_id, kind FROM post_interactions
                 WHERE user_id = ?1 AND post_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&user_id];
            params.extend(post_ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(InteractionRow {
                        post_id: row.get(0)?,
                        user_id: row.get(1)?,
                        kind: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn has_interaction(
        &self,
        post_id: i64,
        user_id: i64,
        kind: InteractionKind,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM post_interactions
                     WHERE post_id = ?1 AND user_id = ?2 AND kind = ?3",
                    rusqlite::params![post_id, user_id, kind.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Comments --

    pub fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, user_id, username, text, created_at
                 FROM comments
                 WHERE post_id = ?1
                 ORDER BY created_at, id",
            )?;

            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        user_id: row.get(2)?,
                        username: row.get(3)?,
                        text: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Insert a comment and bump the post's comments_count in one
    /// transaction. Returns None when the post is unknown.
    pub fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        username: &str,
        text: &str,
    ) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let author_id: Option<i64> = tx
                .query_row("SELECT author_id FROM posts WHERE id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(author_id) = author_id else {
                return Ok(None);
            };

            tx.execute(
                "INSERT INTO comments (post_id, user_id, username, text)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![post_id, user_id, username, text],
            )?;
            let comment_id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?1",
                [post_id],
            )?;

            if author_id != user_id {
                insert_notification(
                    &tx,
                    author_id,
                    "comment",
                    user_id,
                    "commented on your post",
                    Some(post_id),
                )?;
            }

            let row = tx
                .query_row(
                    "SELECT id, post_id, user_id, username, text, created_at
                     FROM comments WHERE id = ?1",
                    [comment_id],
                    |row| {
                        Ok(CommentRow {
                            id: row.get(0)?,
                            post_id: row.get(1)?,
                            user_id: row.get(2)?,
                            username: row.get(3)?,
                            text: row.get(4)?,
                            created_at: row.get(5)?,
                        })
                    },
                )?;

            tx.commit()?;
            Ok(Some(row))
        })
    }
}

pub(crate) fn insert_notification(
    conn: &Connection,
    recipient_id: i64,
    kind: &str,
    actor_id: i64,
    content: &str,
    post_id: Option<i64>,
) -> Result<()> {
    let actor_handle: String = conn.query_row(
        "SELECT username FROM users WHERE id = ?1",
        [actor_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO notifications (user_id, kind, actor_id, actor_handle, content, post_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![recipient_id, kind, actor_id, actor_handle, content, post_id],
    )?;
    Ok(())
}

fn query_post_by_id(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, author_id, author_handle, content, likes_count,
                reposts_count, comments_count, created_at
         FROM posts WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_post).optional()?;
    Ok(row)
}

fn map_post(row: &rusqlite::Row<'_>) -> std::result::Result<PostRow, rusqlite::Error> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_handle: row.get(2)?,
        content: row.get(3)?,
        likes_count: row.get(4)?,
        reposts_count: row.get(5)?,
        comments_count: row.get(6)?,
        created_at: row.get(7)?,
    })
}
