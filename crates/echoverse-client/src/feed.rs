use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use echoverse_types::models::{Comment, Reaction, ReactionType};

use crate::backend::{Backend, Result, Session};
use crate::composer::StoryComposer;
use crate::story_card::{CardUi, CardView, FeedStory, StoryCard};
use crate::toast::{Notifier, Toast};

pub const LOADING_MESSAGE: &str = "Loading echoes...";
pub const EMPTY_MESSAGE: &str = "No echoes yet. Be the first to share!";

/// Where the application should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Feed,
    Auth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    /// No session; nothing is rendered.
    SignedOut,
    Loading,
    Empty,
    Stories(Vec<CardView>),
}

impl FeedView {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_MESSAGE),
            Self::Empty => Some(EMPTY_MESSAGE),
            _ => None,
        }
    }
}

/// The feed page: owns the session and the full dataset, and re-fetches
/// everything after each successful mutation.
pub struct FeedPage {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    route: Route,
    session: Option<Session>,
    session_changes: Option<watch::Receiver<Option<Session>>>,
    loading: bool,
    stories: Vec<FeedStory>,
    reactions: Vec<Reaction>,
    comments: Vec<Comment>,
    cards: Vec<StoryCard>,
    composer: Option<StoryComposer>,
}

impl FeedPage {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            route: Route::Feed,
            session: None,
            session_changes: None,
            loading: true,
            stories: Vec::new(),
            reactions: Vec::new(),
            comments: Vec::new(),
            cards: Vec::new(),
            composer: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn stories(&self) -> &[FeedStory] {
        &self.stories
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn cards(&self) -> &[StoryCard] {
        &self.cards
    }

    pub fn card(&self, story_id: Uuid) -> Option<&StoryCard> {
        self.cards.iter().find(|c| c.story_id() == story_id)
    }

    pub fn card_mut(&mut self, story_id: Uuid) -> Option<&mut StoryCard> {
        self.cards.iter_mut().find(|c| c.story_id() == story_id)
    }

    /// Only present while signed in.
    pub fn composer(&self) -> Option<&StoryComposer> {
        self.composer.as_ref()
    }

    pub fn composer_mut(&mut self) -> Option<&mut StoryComposer> {
        self.composer.as_mut()
    }

    /// Reads the current session and starts listening for changes to it.
    pub async fn mount(&mut self) {
        let mut changes = self.backend.on_auth_state_change();
        changes.borrow_and_update();
        self.session_changes = Some(changes);

        let session = match self.backend.get_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not read session: {}", e);
                None
            }
        };
        self.apply_session(session).await;
    }

    /// Applies a pending session-change notification, if any.
    /// Returns true when one was applied.
    pub async fn sync_session(&mut self) -> bool {
        let Some(changes) = self.session_changes.as_mut() else {
            return false;
        };
        if !changes.has_changed().unwrap_or(false) {
            return false;
        }
        let session = changes.borrow_and_update().clone();
        self.apply_session(session).await;
        true
    }

    /// Waits for the next session change and applies it. Returns false once
    /// the backend has gone away.
    pub async fn next_session_change(&mut self) -> bool {
        let Some(changes) = self.session_changes.as_mut() else {
            return false;
        };
        if changes.changed().await.is_err() {
            return false;
        }
        let session = changes.borrow_and_update().clone();
        self.apply_session(session).await;
        true
    }

    async fn apply_session(&mut self, session: Option<Session>) {
        match session {
            None => {
                if self.session.take().is_some() {
                    info!("Session ended");
                }
                self.composer = None;
                self.stories.clear();
                self.reactions.clear();
                self.comments.clear();
                self.cards.clear();
                self.redirect(Route::Auth);
            }
            Some(session) => {
                let same_user = self.session.as_ref().map(|s| s.user_id) == Some(session.user_id);
                if !same_user || self.composer.is_none() {
                    self.composer = Some(StoryComposer::new(
                        self.backend.clone(),
                        self.notifier.clone(),
                        session.user_id,
                    ));
                }
                self.session = Some(session);
                self.route = Route::Feed;
                self.fetch_stories().await;
            }
        }
    }

    fn redirect(&mut self, route: Route) {
        if self.route != route {
            debug!("Redirecting to {:?}", route);
        }
        self.route = route;
    }

    /// Reloads stories, profiles, reactions and comments, then rebuilds the cards.
    pub async fn fetch_stories(&mut self) {
        self.loading = true;
        match self.load_all().await {
            Ok((stories, reactions, comments)) => {
                debug!(
                    "Loaded {} stories, {} reactions, {} comments",
                    stories.len(),
                    reactions.len(),
                    comments.len()
                );
                self.stories = stories;
                self.reactions = reactions;
                self.comments = comments;
                self.rebuild_cards();
            }
            Err(e) => {
                warn!("Loading feed failed: {}", e);
                self.notifier.notify(Toast::error("Failed to load stories"));
            }
        }
        self.loading = false;
    }

    async fn load_all(&self) -> Result<(Vec<FeedStory>, Vec<Reaction>, Vec<Comment>)> {
        let stories = self.backend.select_stories().await?;
        let profiles = self.backend.select_profiles().await?;
        let usernames: HashMap<Uuid, String> = profiles
            .into_iter()
            .map(|p| (p.user_id, p.username))
            .collect();

        let stories = stories
            .into_iter()
            .map(|story| FeedStory {
                author_username: usernames.get(&story.author_id).cloned(),
                story,
            })
            .collect();

        let reactions = self.backend.select_reactions().await?;
        let comments = self.backend.select_comments().await?;
        Ok((stories, reactions, comments))
    }

    /// Cards keep their expanded/draft state across rebuilds, keyed by story id.
    fn rebuild_cards(&mut self) {
        let mut previous: HashMap<Uuid, CardUi> = self
            .cards
            .drain(..)
            .map(|card| (card.story_id(), card.into_ui()))
            .collect();

        let current_user = self.session.as_ref().map(|s| s.user_id);
        self.cards = self
            .stories
            .iter()
            .map(|entry| {
                let id = entry.story.id;
                let reactions = self.reactions.iter().filter(|r| r.story_id == id).cloned().collect();
                let comments = self.comments.iter().filter(|c| c.story_id == id).cloned().collect();
                StoryCard::new(
                    self.backend.clone(),
                    self.notifier.clone(),
                    entry.clone(),
                    reactions,
                    comments,
                    current_user,
                )
                .with_ui(previous.remove(&id).unwrap_or_default())
            })
            .collect();
    }

    pub async fn post_story(&mut self) -> bool {
        let Some(composer) = self.composer.as_mut() else {
            return false;
        };
        let posted = composer.submit().await;
        if posted {
            self.fetch_stories().await;
        }
        posted
    }

    pub async fn toggle_reaction(&mut self, story_id: Uuid, kind: ReactionType) -> bool {
        let Some(card) = self.card(story_id) else {
            return false;
        };
        let changed = card.toggle_reaction(kind).await;
        if changed {
            self.fetch_stories().await;
        }
        changed
    }

    pub fn toggle_comments(&mut self, story_id: Uuid) {
        if let Some(card) = self.card_mut(story_id) {
            card.toggle_comments();
        }
    }

    pub async fn add_comment(&mut self, story_id: Uuid) -> bool {
        let Some(card) = self.card_mut(story_id) else {
            return false;
        };
        let added = card.add_comment().await;
        if added {
            self.fetch_stories().await;
        }
        added
    }

    pub async fn logout(&mut self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!("Sign out failed: {}", e);
            self.notifier.notify(Toast::error("Failed to logout"));
            return;
        }
        self.notifier.notify(Toast::success("Logged out successfully"));
        if let Some(changes) = self.session_changes.as_mut() {
            changes.borrow_and_update();
        }
        self.apply_session(None).await;
    }

    pub fn view(&self, now: DateTime<Utc>) -> FeedView {
        if self.session.is_none() {
            return FeedView::SignedOut;
        }
        if self.loading {
            return FeedView::Loading;
        }
        if self.cards.is_empty() {
            return FeedView::Empty;
        }
        FeedView::Stories(self.cards.iter().map(|card| card.view(now)).collect())
    }
}
