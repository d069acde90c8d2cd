//! Bulk loading of fixture data, bypassing the signup path.

use anyhow::{Context, Result};
use rusqlite::params;
use serde::Deserialize;
use tracing::info;

use crate::Database;
use crate::migrations;
use crate::models::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

/// A user fixture. `password` must already be a hash.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedFollow {
    pub user_being_followed_id: i64,
    pub user_following_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedLike {
    pub liker_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub messages: Vec<SeedMessage>,
    pub follows: Vec<SeedFollow>,
    pub likes: Vec<SeedLike>,
}

impl Database {
    /// Drops all tables and recreates the schema.
    pub fn reset(&self) -> Result<()> {
        self.with_conn(migrations::reset)
    }

    /// Inserts every fixture row in one transaction; nothing is written if
    /// any row is rejected.
    pub fn load_seed(&self, data: &SeedData) -> Result<()> {
        self.with_tx(|tx| {
            for u in &data.users {
                tx.execute(
                    "INSERT INTO users
                        (id, email, username, image_url, header_image_url, bio, location, password)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        u.id,
                        u.email,
                        u.username,
                        blank_to_none(&u.image_url).unwrap_or(DEFAULT_IMAGE_URL),
                        blank_to_none(&u.header_image_url).unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                        blank_to_none(&u.bio),
                        blank_to_none(&u.location),
                        u.password
                    ],
                )
                .with_context(|| format!("inserting user {:?}", u.username))?;
            }

            for m in &data.messages {
                tx.execute(
                    "INSERT INTO messages (id, text, timestamp, user_id)
                     VALUES (?1, ?2, COALESCE(?3, strftime('%Y-%m-%d %H:%M:%f', 'now')), ?4)",
                    params![m.id, m.text, blank_to_none(&m.timestamp), m.user_id],
                )
                .with_context(|| format!("inserting message by user {}", m.user_id))?;
            }

            for f in &data.follows {
                tx.execute(
                    "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                     VALUES (?1, ?2)",
                    [f.user_being_followed_id, f.user_following_id],
                )
                .with_context(|| {
                    format!(
                        "inserting follow {} -> {}",
                        f.user_following_id, f.user_being_followed_id
                    )
                })?;
            }

            for l in &data.likes {
                tx.execute(
                    "INSERT OR IGNORE INTO likes (liker_id, message_id) VALUES (?1, ?2)",
                    [l.liker_id, l.message_id],
                )
                .with_context(|| format!("inserting like {} on {}", l.liker_id, l.message_id))?;
            }

            info!(
                users = data.users.len(),
                messages = data.messages.len(),
                follows = data.follows.len(),
                likes = data.likes.len(),
                "Seed data loaded"
            );
            Ok(())
        })
    }
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
