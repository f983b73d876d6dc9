/// Database row types. These map directly to SQLite rows.
/// Distinct from echoverse-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct ProfileRow {
    pub user_id: String,
    pub username: String,
}

pub struct StoryRow {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: String,
}

#[derive(Debug)]
pub struct ReactionRow {
    pub id: String,
    pub story_id: String,
    pub user_id: String,
    pub reaction_type: String,
}

pub struct CommentRow {
    pub id: String,
    pub story_id: String,
    pub user_id: String,
    pub content: String,
    pub commenter_alias: Option<String>,
    pub created_at: String,
}
