use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use echoverse_types::models::{Comment, NewComment, NewReaction, Reaction, ReactionType, Story};
use echoverse_types::validation::validate_comment;

use crate::backend::Backend;
use crate::time::format_distance;
use crate::toast::{Notifier, Toast};

/// A story joined with its author's display name, if a profile exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStory {
    pub story: Story,
    pub author_username: Option<String>,
}

/// Card state that survives a feed re-fetch.
#[derive(Debug, Clone, Default)]
pub struct CardUi {
    pub comments_expanded: bool,
    pub comment_draft: String,
    pub alias_draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionButton {
    pub kind: ReactionType,
    /// None when nobody reacted with this type; no badge is shown.
    pub count: Option<usize>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub alias: String,
    pub posted: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub story_id: Uuid,
    pub author_label: String,
    pub posted: String,
    pub content: String,
    pub reactions: Vec<ReactionButton>,
    pub comment_count: Option<usize>,
    pub comments_expanded: bool,
    /// Empty unless the thread is expanded.
    pub comments: Vec<CommentView>,
    pub can_post_comment: bool,
}

/// One story with its reactions and comment thread.
pub struct StoryCard {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    entry: FeedStory,
    reactions: Vec<Reaction>,
    comments: Vec<Comment>,
    current_user: Option<Uuid>,
    ui: CardUi,
    loading: bool,
}

impl StoryCard {
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        entry: FeedStory,
        reactions: Vec<Reaction>,
        comments: Vec<Comment>,
        current_user: Option<Uuid>,
    ) -> Self {
        Self {
            backend,
            notifier,
            entry,
            reactions,
            comments,
            current_user,
            ui: CardUi::default(),
            loading: false,
        }
    }

    pub fn with_ui(mut self, ui: CardUi) -> Self {
        self.ui = ui;
        self
    }

    pub fn story_id(&self) -> Uuid {
        self.entry.story.id
    }

    pub fn story(&self) -> &FeedStory {
        &self.entry
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn ui(&self) -> &CardUi {
        &self.ui
    }

    pub fn into_ui(self) -> CardUi {
        self.ui
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn reaction_count(&self, kind: ReactionType) -> usize {
        self.reactions.iter().filter(|r| r.reaction_type == kind).count()
    }

    /// Types the current user has already applied to this story.
    pub fn user_reactions(&self) -> BTreeSet<ReactionType> {
        match self.current_user {
            Some(user) => self
                .reactions
                .iter()
                .filter(|r| r.user_id == user)
                .map(|r| r.reaction_type)
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Removes the user's reaction of this type if present, otherwise adds one.
    /// Returns true when the feed should re-fetch.
    pub async fn toggle_reaction(&self, kind: ReactionType) -> bool {
        let Some(user_id) = self.current_user else {
            self.notifier.notify(Toast::error("Please login to react"));
            return false;
        };

        let existing = self
            .reactions
            .iter()
            .find(|r| r.user_id == user_id && r.reaction_type == kind);

        let result = match existing {
            Some(reaction) => {
                debug!("Removing {} reaction {} from story {}", kind, reaction.id, self.story_id());
                self.backend.delete_reaction(reaction.id).await
            }
            None => {
                debug!("Adding {} reaction to story {}", kind, self.story_id());
                self.backend
                    .insert_reaction(&NewReaction {
                        story_id: self.story_id(),
                        user_id,
                        reaction_type: kind,
                    })
                    .await
                    .map(|_| ())
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Reaction toggle on story {} failed: {}", self.story_id(), e);
                self.notifier.notify(Toast::error("Failed to update reaction"));
                false
            }
        }
    }

    pub fn toggle_comments(&mut self) {
        self.ui.comments_expanded = !self.ui.comments_expanded;
    }

    pub fn set_comment_draft(&mut self, content: impl Into<String>) {
        self.ui.comment_draft = content.into();
    }

    pub fn set_alias_draft(&mut self, alias: impl Into<String>) {
        self.ui.alias_draft = alias.into();
    }

    pub fn can_post_comment(&self) -> bool {
        !self.loading && !self.ui.comment_draft.trim().is_empty()
    }

    /// Posts the drafted comment. Returns true when the feed should re-fetch.
    pub async fn add_comment(&mut self) -> bool {
        let Some(user_id) = self.current_user else {
            self.notifier.notify(Toast::error("Please login to comment"));
            return false;
        };

        if let Err(e) = validate_comment(&self.ui.comment_draft, Some(self.ui.alias_draft.as_str())) {
            self.notifier.notify(Toast::error(e.to_string()));
            return false;
        }

        let alias = self.ui.alias_draft.trim();
        let comment = NewComment {
            story_id: self.story_id(),
            user_id,
            content: self.ui.comment_draft.clone(),
            commenter_alias: (!alias.is_empty()).then(|| alias.to_string()),
        };

        self.loading = true;
        let result = self.backend.insert_comment(&comment).await;
        self.loading = false;

        match result {
            Ok(created) => {
                debug!("Comment {} added to story {}", created.id, self.story_id());
                self.notifier.notify(Toast::success("Comment added"));
                self.ui.comment_draft.clear();
                self.ui.alias_draft.clear();
                true
            }
            Err(e) => {
                warn!("Adding comment to story {} failed: {}", self.story_id(), e);
                self.notifier.notify(Toast::error("Failed to add comment"));
                false
            }
        }
    }

    pub fn author_label(&self) -> String {
        if self.entry.story.is_anonymous {
            "Anonymous".to_string()
        } else {
            self.entry
                .author_username
                .clone()
                .unwrap_or_else(|| "Unknown".to_string())
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> CardView {
        let mine = self.user_reactions();
        let reactions = ReactionType::ALL
            .into_iter()
            .map(|kind| {
                let count = self.reaction_count(kind);
                ReactionButton {
                    kind,
                    count: (count > 0).then_some(count),
                    active: mine.contains(&kind),
                }
            })
            .collect();

        let comments = if self.ui.comments_expanded {
            self.comments
                .iter()
                .map(|c| CommentView {
                    alias: c
                        .commenter_alias
                        .clone()
                        .filter(|a| !a.is_empty())
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    posted: format_distance(c.created_at, now),
                    content: c.content.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        CardView {
            story_id: self.story_id(),
            author_label: self.author_label(),
            posted: format_distance(self.entry.story.created_at, now),
            content: self.entry.story.content.clone(),
            reactions,
            comment_count: (!self.comments.is_empty()).then_some(self.comments.len()),
            comments_expanded: self.ui.comments_expanded,
            comments,
            can_post_comment: self.can_post_comment(),
        }
    }
}
