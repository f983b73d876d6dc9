//! In-memory [`Backend`] for component tests: counts calls per operation and
//! can be told to fail any of them.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use tokio::sync::watch;
use uuid::Uuid;

use echoverse_types::models::{
    Comment, NewComment, NewReaction, NewStory, Profile, Reaction, ReactionType, Story,
};

use crate::backend::{Backend, ClientError, Result, Session};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    stories: Vec<Story>,
    reactions: Vec<Reaction>,
    comments: Vec<Comment>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing so insertion order and time order agree.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }
}

pub struct MemoryBackend {
    tables: Mutex<Tables>,
    session: watch::Sender<Option<Session>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            tables: Mutex::new(Tables::default()),
            session,
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    /// Total calls to any `select_*` operation.
    pub fn reads(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op.starts_with("select_"))
            .map(|(_, n)| n)
            .sum()
    }

    /// Simulates the session ending outside the application, e.g. expiry.
    pub fn expire_session(&self) {
        self.session.send_replace(None);
    }

    pub fn seed_story(&self, author_id: Uuid, content: &str, is_anonymous: bool) -> Story {
        let mut tables = self.tables.lock().unwrap();
        let story = Story {
            id: Uuid::new_v4(),
            author_id,
            content: content.to_string(),
            is_anonymous,
            created_at: tables.next_timestamp(),
        };
        tables.stories.push(story.clone());
        story
    }

    pub fn seed_reaction(&self, story_id: Uuid, user_id: Uuid, reaction_type: ReactionType) -> Reaction {
        let reaction = Reaction {
            id: Uuid::new_v4(),
            story_id,
            user_id,
            reaction_type,
        };
        self.tables.lock().unwrap().reactions.push(reaction.clone());
        reaction
    }

    pub fn seed_comment(&self, story_id: Uuid, user_id: Uuid, content: &str, alias: Option<&str>) -> Comment {
        let mut tables = self.tables.lock().unwrap();
        let comment = Comment {
            id: Uuid::new_v4(),
            story_id,
            user_id,
            content: content.to_string(),
            commenter_alias: alias.map(str::to_string),
            created_at: tables.next_timestamp(),
        };
        tables.comments.push(comment.clone());
        comment
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if self.failing.lock().unwrap().contains(op) {
            return Err(ClientError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }

    fn require_session(&self) -> Result<Session> {
        self.session.borrow().clone().ok_or(ClientError::NotSignedIn)
    }

    fn open_session(&self, username: &str) -> Session {
        let mut tables = self.tables.lock().unwrap();
        let user_id = match tables.profiles.iter().find(|p| p.username == username) {
            Some(profile) => profile.user_id,
            None => {
                let user_id = Uuid::new_v4();
                tables.profiles.push(Profile {
                    user_id,
                    username: username.to_string(),
                });
                user_id
            }
        };
        let session = Session {
            user_id,
            username: username.to_string(),
            access_token: Uuid::new_v4().to_string(),
        };
        self.session.send_replace(Some(session.clone()));
        session
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>> {
        self.enter("get_session")?;
        Ok(self.session.borrow().clone())
    }

    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn sign_up(&self, username: &str, _password: &str) -> Result<Session> {
        self.enter("sign_up")?;
        Ok(self.open_session(username))
    }

    async fn sign_in(&self, username: &str, _password: &str) -> Result<Session> {
        self.enter("sign_in")?;
        Ok(self.open_session(username))
    }

    async fn sign_out(&self) -> Result<()> {
        self.enter("sign_out")?;
        self.require_session()?;
        self.session.send_replace(None);
        Ok(())
    }

    async fn select_stories(&self) -> Result<Vec<Story>> {
        self.enter("select_stories")?;
        let mut stories = self.tables.lock().unwrap().stories.clone();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn insert_story(&self, story: &NewStory) -> Result<Story> {
        self.enter("insert_story")?;
        let mut tables = self.tables.lock().unwrap();
        let created = Story {
            id: Uuid::new_v4(),
            author_id: story.author_id,
            content: story.content.clone(),
            is_anonymous: story.is_anonymous,
            created_at: tables.next_timestamp(),
        };
        tables.stories.push(created.clone());
        Ok(created)
    }

    async fn select_profiles(&self) -> Result<Vec<Profile>> {
        self.enter("select_profiles")?;
        Ok(self.tables.lock().unwrap().profiles.clone())
    }

    async fn select_reactions(&self) -> Result<Vec<Reaction>> {
        self.enter("select_reactions")?;
        Ok(self.tables.lock().unwrap().reactions.clone())
    }

    async fn insert_reaction(&self, reaction: &NewReaction) -> Result<Reaction> {
        self.enter("insert_reaction")?;
        Ok(self.seed_reaction(reaction.story_id, reaction.user_id, reaction.reaction_type))
    }

    async fn delete_reaction(&self, id: Uuid) -> Result<()> {
        self.enter("delete_reaction")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.reactions.len();
        tables.reactions.retain(|r| r.id != id);
        if tables.reactions.len() == before {
            return Err(ClientError::Status(StatusCode::NOT_FOUND));
        }
        Ok(())
    }

    async fn select_comments(&self) -> Result<Vec<Comment>> {
        self.enter("select_comments")?;
        let mut comments = self.tables.lock().unwrap().comments.clone();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.enter("insert_comment")?;
        Ok(self.seed_comment(
            comment.story_id,
            comment.user_id,
            &comment.content,
            comment.commenter_alias.as_deref(),
        ))
    }
}
