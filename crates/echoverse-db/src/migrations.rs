use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS profiles (
            user_id     TEXT PRIMARY KEY REFERENCES users(id),
            username    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS stories (
            id              TEXT PRIMARY KEY,
            author_id       TEXT NOT NULL REFERENCES users(id),
            content         TEXT NOT NULL,
            is_anonymous    INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_stories_created
            ON stories(created_at);

        -- No UNIQUE(story_id, user_id, reaction_type): duplicates are left to callers.
        CREATE TABLE IF NOT EXISTS reactions (
            id              TEXT PRIMARY KEY,
            story_id        TEXT NOT NULL REFERENCES stories(id),
            user_id         TEXT NOT NULL REFERENCES users(id),
            reaction_type   TEXT NOT NULL CHECK (reaction_type IN ('heart', 'sad', 'wow')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_story
            ON reactions(story_id);

        CREATE TABLE IF NOT EXISTS comments (
            id              TEXT PRIMARY KEY,
            story_id        TEXT NOT NULL REFERENCES stories(id),
            user_id         TEXT NOT NULL REFERENCES users(id),
            content         TEXT NOT NULL,
            commenter_alias TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_story
            ON comments(story_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
