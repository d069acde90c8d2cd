use std::collections::HashSet;

use crate::models::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, MessageRow, NewUser, ProfileUpdate,
    TIMESTAMP_FORMAT, UserRow, UserStats,
};
use crate::{Database, DbError};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location";

const MESSAGE_SELECT: &str = "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
     FROM messages m
     JOIN users u ON u.id = m.user_id";

impl Database {
    // -- Users --

    pub fn create_user(&self, new: &NewUser<'_>) -> std::result::Result<UserRow, DbError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (username, email, password, image_url) VALUES (?1, ?2, ?3, ?4)",
            params![
                new.username,
                new.email,
                new.password_hash,
                new.image_url.unwrap_or(DEFAULT_IMAGE_URL)
            ],
        )?;
        let id = conn.last_insert_rowid();
        let user = query_user_by_id(&conn, id)?
            .ok_or_else(|| anyhow!("User {} missing right after insert", id))?;
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
                    [username],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// All users, or those whose username contains `search`. The match is a
    /// literal, case-sensitive substring: `%` and `_` carry no special meaning.
    pub fn search_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| match search {
            Some(q) => collect_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users u WHERE instr(u.username, ?1) > 0 ORDER BY u.id"
                ),
                params![q],
            ),
            None => collect_users(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.id"),
                params![],
            ),
        })
    }

    pub fn update_user(
        &self,
        id: i64,
        update: &ProfileUpdate<'_>,
    ) -> std::result::Result<(), DbError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE users
             SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                 bio = ?5, location = ?6
             WHERE id = ?7",
            params![
                update.username,
                update.email,
                update.image_url.unwrap_or(DEFAULT_IMAGE_URL),
                update.header_image_url.unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                update.bio,
                update.location,
                id
            ],
        )?;
        if changed == 0 {
            return Err(anyhow!("User not found: {}", id).into());
        }
        Ok(())
    }

    /// Replaces the stored password hash, e.g. when upgrading a legacy hash.
    pub fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                params![password_hash, id],
            )?;
            if changed == 0 {
                return Err(anyhow!("User not found: {}", id));
            }
            Ok(())
        })
    }

    /// Deletes a user and every row that references it: likes by the user and
    /// on the user's messages, the messages, and follow edges in both
    /// directions. Returns false if no such user existed.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let likes = tx.execute(
                "DELETE FROM likes
                 WHERE liker_id = ?1
                    OR message_id IN (SELECT id FROM messages WHERE user_id = ?1)",
                [id],
            )?;
            let messages = tx.execute("DELETE FROM messages WHERE user_id = ?1", [id])?;
            let follows = tx.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 OR user_following_id = ?1",
                [id],
            )?;
            let users = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            debug!(user_id = id, likes, messages, follows, "Cascade-deleted user rows");
            Ok(users > 0)
        })
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE liker_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Follows --

    /// Adds the edge `follower -> followed`. Returns false if it already existed.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)",
                [followed_id, follower_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Removes the edge `follower -> followed`. Returns false if there was none.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                [followed_id, follower_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                    [followed_id, follower_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Users that `user_id` follows.
    pub fn list_following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            collect_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM follows f
                     JOIN users u ON u.id = f.user_being_followed_id
                     WHERE f.user_following_id = ?1
                     ORDER BY u.username"
                ),
                params![user_id],
            )
        })
    }

    /// Users that follow `user_id`.
    pub fn list_followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            collect_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM follows f
                     JOIN users u ON u.id = f.user_following_id
                     WHERE f.user_being_followed_id = ?1
                     ORDER BY u.username"
                ),
                params![user_id],
            )
        })
    }

    /// Ids of the users `user_id` follows, for rendering follow buttons.
    pub fn following_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.with_conn(|conn| {
            collect_ids(
                conn,
                "SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1",
                user_id,
            )
        })
    }

    // -- Messages --

    pub fn create_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        let timestamp = chrono::Utc::now()
            .naive_utc()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
                params![text, timestamp, user_id],
            )?;
            let id = conn.last_insert_rowid();
            query_message_by_id(conn, id)?
                .ok_or_else(|| anyhow!("Message {} missing right after insert", id))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message_by_id(conn, id))
    }

    /// Deletes a message along with the likes on it.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM likes WHERE message_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    /// A user's own messages, newest first.
    pub fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            collect_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     WHERE m.user_id = ?1
                     ORDER BY m.timestamp DESC, m.id DESC"
                ),
                params![user_id],
            )
        })
    }

    /// Messages by the user and everyone the user follows, newest first.
    pub fn home_feed(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            collect_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     WHERE m.user_id = ?1
                        OR m.user_id IN (
                            SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                        )
                     ORDER BY m.timestamp DESC, m.id DESC
                     LIMIT ?2"
                ),
                params![user_id, limit],
            )
        })
    }

    // -- Likes --

    /// Records a like. Returns false if the user already liked the message.
    pub fn like(&self, liker_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO likes (liker_id, message_id) VALUES (?1, ?2)",
                [liker_id, message_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Removes a like if present.
    pub fn unlike(&self, liker_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE liker_id = ?1 AND message_id = ?2",
                [liker_id, message_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn liked_message_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.with_conn(|conn| {
            collect_ids(conn, "SELECT message_id FROM likes WHERE liker_id = ?1", user_id)
        })
    }

    /// Messages `user_id` has liked, newest first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            collect_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     JOIN likes l ON l.message_id = m.id
                     WHERE l.liker_id = ?1
                     ORDER BY m.timestamp DESC, m.id DESC"
                ),
                params![user_id],
            )
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
    })
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
            [id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

fn query_message_by_id(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let message = conn
        .query_row(
            &format!("{MESSAGE_SELECT} WHERE m.id = ?1"),
            [id],
            message_from_row,
        )
        .optional()?;
    Ok(message)
}

fn collect_users(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn collect_messages(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn collect_ids(conn: &Connection, sql: &str, id: i64) -> Result<HashSet<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<HashSet<i64>, _>>()?;
    Ok(ids)
}
