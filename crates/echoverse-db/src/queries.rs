use crate::models::{CommentRow, ProfileRow, ReactionRow, StoryRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users & profiles --

    /// Creates the account and its public profile together.
    /// Returns false, writing nothing, when the username is already taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            match tx.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            ) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Ok(false),
                Err(e) => return Err(e.into()),
            }
            tx.execute(
                "INSERT INTO profiles (user_id, username) VALUES (?1, ?2)",
                (id, username),
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn list_profiles(&self) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT user_id, username FROM profiles")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ProfileRow {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Sessions --

    pub fn create_session(&self, id: &str, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, user_id) VALUES (?1, ?2)",
                (id, user_id),
            )?;
            Ok(())
        })
    }

    pub fn session_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM sessions WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Returns true if a session row was removed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Stories --

    pub fn insert_story(&self, story: &StoryRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO stories (id, author_id, content, is_anonymous, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    story.id,
                    story.author_id,
                    story.content,
                    story.is_anonymous,
                    story.created_at
                ],
            )?;
            Ok(())
        })
    }

    /// All stories, newest first.
    pub fn list_stories(&self) -> Result<Vec<StoryRow>> {
        self.with_conn(query_stories)
    }

    pub fn story_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM stories WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Reactions --

    pub fn insert_reaction(&self, reaction: &ReactionRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reactions (id, story_id, user_id, reaction_type) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    reaction.id,
                    reaction.story_id,
                    reaction.user_id,
                    reaction.reaction_type
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_reactions(&self) -> Result<Vec<ReactionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, story_id, user_id, reaction_type FROM reactions ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([], map_reaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_reaction(&self, id: &str) -> Result<Option<ReactionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, story_id, user_id, reaction_type FROM reactions WHERE id = ?1",
                [id],
                map_reaction,
            )
            .optional()
        })
    }

    /// Returns true if a reaction row was removed.
    pub fn delete_reaction(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM reactions WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, comment: &CommentRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, story_id, user_id, content, commenter_alias, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    comment.id,
                    comment.story_id,
                    comment.user_id,
                    comment.content,
                    comment.commenter_alias,
                    comment.created_at
                ],
            )?;
            Ok(())
        })
    }

    /// All comments, oldest first.
    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, story_id, user_id, content, commenter_alias, created_at
                 FROM comments
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        story_id: row.get(1)?,
                        user_id: row.get(2)?,
                        content: row.get(3)?,
                        commenter_alias: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_stories(conn: &Connection) -> Result<Vec<StoryRow>> {
    // rowid breaks ties between stories created within the same microsecond
    let mut stmt = conn.prepare(
        "SELECT id, author_id, content, is_anonymous, created_at
         FROM stories
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(StoryRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                content: row.get(2)?,
                is_anonymous: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_reaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReactionRow> {
    Ok(ReactionRow {
        id: row.get(0)?,
        story_id: row.get(1)?,
        user_id: row.get(2)?,
        reaction_type: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
