use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use echoverse_types::models::{Comment, NewComment, NewReaction, NewStory, Profile, Reaction, Story};

/// The signed-in user as seen by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("not signed in")]
    NotSignedIn,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything the application needs from the data/auth service: session
/// handling plus read/insert/delete on the four tables. There is no update.
#[async_trait]
pub trait Backend: Send + Sync {
    // -- Auth --

    async fn get_session(&self) -> Result<Option<Session>>;

    /// Yields the current session and every later change to it.
    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_up(&self, username: &str, password: &str) -> Result<Session>;

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    // -- Tables --

    /// Newest first.
    async fn select_stories(&self) -> Result<Vec<Story>>;

    async fn insert_story(&self, story: &NewStory) -> Result<Story>;

    async fn select_profiles(&self) -> Result<Vec<Profile>>;

    async fn select_reactions(&self) -> Result<Vec<Reaction>>;

    async fn insert_reaction(&self, reaction: &NewReaction) -> Result<Reaction>;

    async fn delete_reaction(&self, id: Uuid) -> Result<()>;

    /// Oldest first.
    async fn select_comments(&self) -> Result<Vec<Comment>>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;
}
