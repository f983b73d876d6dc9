use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use echoverse_types::api::{CurrentSession, LoginRequest, RegisterRequest, SessionResponse};
use echoverse_types::models::{Comment, NewComment, NewReaction, NewStory, Profile, Reaction, Story};

use crate::backend::{Backend, ClientError, Result, Session};

/// [`Backend`] over the EchoVerse REST service.
///
/// Holds the current session in a watch channel; every sign-in, sign-out or
/// rejected token is published to subscribers of `on_auth_state_change`.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    session: watch::Sender<Option<Session>>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(ClientError::NotSignedIn)
    }

    fn set_session(&self, session: Option<Session>) {
        self.session.send_replace(session);
    }

    /// A 401 on an authenticated call means the session is gone server-side.
    fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED && self.session.borrow().is_some() {
            warn!("Session rejected by service, signing out locally");
            self.set_session(None);
        }
        Err(ClientError::Status(status))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Ok(self.check(response)?.json().await?)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(self.token()?)
            .json(body)
            .send()
            .await?;
        Ok(self.check(response)?.json().await?)
    }

    async fn authenticate<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Session> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let issued: SessionResponse = response.json().await?;
        let session = Session {
            user_id: issued.user_id,
            username: issued.username,
            access_token: issued.token,
        };
        info!("Signed in as {}", session.username);
        self.set_session(Some(session.clone()));
        Ok(session)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_session(&self) -> Result<Option<Session>> {
        let Some(local) = self.session.borrow().clone() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.url("/auth/session"))
            .bearer_auth(&local.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Stored session for {} is no longer valid", local.username);
            self.set_session(None);
            return Ok(None);
        }
        let current: CurrentSession = self.check(response)?.json().await?;
        Ok(Some(Session {
            user_id: current.user_id,
            username: current.username,
            access_token: local.access_token,
        }))
    }

    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn sign_up(&self, username: &str, password: &str) -> Result<Session> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/auth/register", &body).await
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/auth/login", &body).await
    }

    async fn sign_out(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        let status = response.status();
        // an already-revoked session still ends up signed out
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            return Err(ClientError::Status(status));
        }
        self.set_session(None);
        Ok(())
    }

    async fn select_stories(&self) -> Result<Vec<Story>> {
        self.get_json("/stories").await
    }

    async fn insert_story(&self, story: &NewStory) -> Result<Story> {
        self.post_json("/stories", story).await
    }

    async fn select_profiles(&self) -> Result<Vec<Profile>> {
        self.get_json("/profiles").await
    }

    async fn select_reactions(&self) -> Result<Vec<Reaction>> {
        self.get_json("/reactions").await
    }

    async fn insert_reaction(&self, reaction: &NewReaction) -> Result<Reaction> {
        self.post_json("/reactions", reaction).await
    }

    async fn delete_reaction(&self, id: Uuid) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/reactions/{id}")))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.check(response)?;
        Ok(())
    }

    async fn select_comments(&self) -> Result<Vec<Comment>> {
        self.get_json("/comments").await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.post_json("/comments", comment).await
    }
}
