use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{SubsecRound, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use echoverse_db::format_timestamp;
use echoverse_db::models::CommentRow;
use echoverse_types::api::Claims;
use echoverse_types::models::{Comment, NewComment};

use crate::auth::AppState;
use crate::convert::comment_from_row;
use crate::run_db;

/// GET /comments: every comment, oldest first.
pub async fn list_comments(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, StatusCode> {
    let rows = run_db(&state, |db| db.list_comments()).await?;
    Ok(Json(rows.into_iter().map(comment_from_row).collect()))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewComment>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.user_id != claims.sub {
        warn!("User {} tried to comment as {}", claims.sub, req.user_id);
        return Err(StatusCode::FORBIDDEN);
    }

    let now = Utc::now().trunc_subsecs(6);
    let comment = Comment {
        id: Uuid::new_v4(),
        story_id: req.story_id,
        user_id: req.user_id,
        content: req.content,
        commenter_alias: req.commenter_alias,
        created_at: now,
    };

    let row = CommentRow {
        id: comment.id.to_string(),
        story_id: comment.story_id.to_string(),
        user_id: comment.user_id.to_string(),
        content: comment.content.clone(),
        commenter_alias: comment.commenter_alias.clone(),
        created_at: format_timestamp(now),
    };
    let inserted = run_db(&state, move |db| {
        if !db.story_exists(&row.story_id)? {
            return Ok(false);
        }
        db.insert_comment(&row)?;
        Ok(true)
    })
    .await?;

    if !inserted {
        return Err(StatusCode::NOT_FOUND);
    }

    info!("Comment {} added to story {}", comment.id, comment.story_id);
    Ok((StatusCode::CREATED, Json(comment)))
}
