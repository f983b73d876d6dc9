use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use echoverse_types::models::NewStory;
use echoverse_types::validation::validate_story;

use crate::backend::Backend;
use crate::toast::{Notifier, Toast};

/// Writes new stories for the signed-in user.
pub struct StoryComposer {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    user_id: Uuid,
    content: String,
    is_anonymous: bool,
    loading: bool,
}

impl StoryComposer {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>, user_id: Uuid) -> Self {
        Self {
            backend,
            notifier,
            user_id,
            content: String::new(),
            is_anonymous: true,
            loading: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn set_anonymous(&mut self, anonymous: bool) {
        self.is_anonymous = anonymous;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.content.trim().is_empty()
    }

    /// Validates and posts the story. Returns true once it is stored, so the
    /// caller can re-fetch the feed.
    pub async fn submit(&mut self) -> bool {
        if let Err(e) = validate_story(&self.content) {
            self.notifier.notify(Toast::error(e.to_string()));
            return false;
        }

        let story = NewStory {
            author_id: self.user_id,
            content: self.content.clone(),
            is_anonymous: self.is_anonymous,
        };

        self.loading = true;
        let result = self.backend.insert_story(&story).await;
        self.loading = false;

        match result {
            Ok(created) => {
                info!("Story {} shared", created.id);
                self.notifier.notify(Toast::success("Your echo has been shared"));
                self.content.clear();
                true
            }
            Err(e) => {
                warn!("Posting story failed: {}", e);
                self.notifier.notify(Toast::error("Failed to post story"));
                false
            }
        }
    }
}
