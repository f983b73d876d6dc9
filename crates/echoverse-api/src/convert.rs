//! Row → API model conversion. Corrupt columns are logged and replaced with
//! defaults rather than failing the whole listing.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use echoverse_db::models::{CommentRow, ProfileRow, ReactionRow, StoryRow};
use echoverse_db::parse_timestamp;
use echoverse_types::models::{Comment, Profile, Reaction, Story};

fn uuid_or_default(raw: &str, column: &str, row_id: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", column, raw, row_id, e);
        Uuid::default()
    })
}

fn timestamp_or_default(raw: &str, row_id: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|e| {
        warn!("Corrupt created_at on row '{}': {}", row_id, e);
        DateTime::default()
    })
}

pub fn story_from_row(row: StoryRow) -> Story {
    Story {
        id: uuid_or_default(&row.id, "id", &row.id),
        author_id: uuid_or_default(&row.author_id, "author_id", &row.id),
        created_at: timestamp_or_default(&row.created_at, &row.id),
        content: row.content,
        is_anonymous: row.is_anonymous,
    }
}

pub fn profile_from_row(row: ProfileRow) -> Profile {
    Profile {
        user_id: uuid_or_default(&row.user_id, "user_id", &row.user_id),
        username: row.username,
    }
}

/// Reactions with an unrecognised type are dropped.
pub fn reaction_from_row(row: ReactionRow) -> Option<Reaction> {
    let reaction_type = match row.reaction_type.parse() {
        Ok(kind) => kind,
        Err(e) => {
            warn!("Skipping reaction '{}': {}", row.id, e);
            return None;
        }
    };
    Some(Reaction {
        id: uuid_or_default(&row.id, "id", &row.id),
        story_id: uuid_or_default(&row.story_id, "story_id", &row.id),
        user_id: uuid_or_default(&row.user_id, "user_id", &row.id),
        reaction_type,
    })
}

pub fn comment_from_row(row: CommentRow) -> Comment {
    Comment {
        id: uuid_or_default(&row.id, "id", &row.id),
        story_id: uuid_or_default(&row.story_id, "story_id", &row.id),
        user_id: uuid_or_default(&row.user_id, "user_id", &row.id),
        created_at: timestamp_or_default(&row.created_at, &row.id),
        content: row.content,
        commenter_alias: row.commenter_alias,
    }
}
