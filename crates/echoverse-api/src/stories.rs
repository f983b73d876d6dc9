use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{SubsecRound, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use echoverse_db::format_timestamp;
use echoverse_db::models::StoryRow;
use echoverse_types::api::Claims;
use echoverse_types::models::{NewStory, Story};

use crate::auth::AppState;
use crate::convert::story_from_row;
use crate::run_db;

/// GET /stories: every story, newest first.
pub async fn list_stories(State(state): State<AppState>) -> Result<Json<Vec<Story>>, StatusCode> {
    let rows = run_db(&state, |db| db.list_stories()).await?;
    Ok(Json(rows.into_iter().map(story_from_row).collect()))
}

/// POST /stories: content length is the client's concern; only authorship is checked here.
pub async fn create_story(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewStory>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.author_id != claims.sub {
        warn!("User {} tried to post as {}", claims.sub, req.author_id);
        return Err(StatusCode::FORBIDDEN);
    }

    // stored with microsecond precision
    let now = Utc::now().trunc_subsecs(6);
    let story = Story {
        id: Uuid::new_v4(),
        author_id: req.author_id,
        content: req.content,
        is_anonymous: req.is_anonymous,
        created_at: now,
    };

    let row = StoryRow {
        id: story.id.to_string(),
        author_id: story.author_id.to_string(),
        content: story.content.clone(),
        is_anonymous: story.is_anonymous,
        created_at: format_timestamp(now),
    };
    run_db(&state, move |db| db.insert_story(&row)).await?;

    info!("Story {} posted (anonymous: {})", story.id, story.is_anonymous);
    Ok((StatusCode::CREATED, Json(story)))
}
