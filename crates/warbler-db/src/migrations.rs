use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                email               TEXT NOT NULL UNIQUE,
                username            TEXT NOT NULL UNIQUE,
                image_url           TEXT NOT NULL DEFAULT '/static/images/default-pic.png',
                header_image_url    TEXT NOT NULL DEFAULT '/static/images/warbler-hero.jpg',
                bio                 TEXT,
                location            TEXT,
                password            TEXT NOT NULL
            );

            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                text        TEXT NOT NULL CHECK (length(text) <= 140),
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                user_id     INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_messages_user
                ON messages(user_id, timestamp);

            CREATE TABLE follows (
                user_being_followed_id  INTEGER NOT NULL REFERENCES users(id),
                user_following_id       INTEGER NOT NULL REFERENCES users(id),
                PRIMARY KEY (user_being_followed_id, user_following_id)
            );

            CREATE INDEX idx_follows_follower
                ON follows(user_following_id);

            CREATE TABLE likes (
                liker_id    INTEGER NOT NULL REFERENCES users(id),
                message_id  INTEGER NOT NULL REFERENCES messages(id),
                PRIMARY KEY (liker_id, message_id)
            );

            CREATE INDEX idx_likes_message
                ON likes(message_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

/// Drops every table and rebuilds the schema from scratch.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS likes;
        DROP TABLE IF EXISTS follows;
        DROP TABLE IF EXISTS messages;
        DROP TABLE IF EXISTS users;
        DROP TABLE IF EXISTS schema_version;
        ",
    )?;
    run(conn)
}
