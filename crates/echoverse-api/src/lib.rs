pub mod auth;
pub mod comments;
pub mod convert;
pub mod middleware;
pub mod profiles;
pub mod reactions;
pub mod stories;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use echoverse_db::Database;

pub use auth::{AppState, AppStateInner};

/// Builds the full service: public auth routes plus the table routes behind `require_auth`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/session", get(auth::current_session))
        .route("/auth/logout", post(auth::logout))
        .route("/stories", get(stories::list_stories).post(stories::create_story))
        .route("/profiles", get(profiles::list_profiles))
        .route("/reactions", get(reactions::list_reactions).post(reactions::create_reaction))
        .route("/reactions/{reaction_id}", delete(reactions::delete_reaction))
        .route("/comments", get(comments::list_comments).post(comments::create_comment))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Runs a blocking DB closure off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("DB error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
