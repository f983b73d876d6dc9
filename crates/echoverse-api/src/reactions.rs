use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, warn};
use uuid::Uuid;

use echoverse_db::models::ReactionRow;
use echoverse_types::api::Claims;
use echoverse_types::models::{NewReaction, Reaction};

use crate::auth::AppState;
use crate::convert::reaction_from_row;
use crate::run_db;

pub async fn list_reactions(State(state): State<AppState>) -> Result<Json<Vec<Reaction>>, StatusCode> {
    let rows = run_db(&state, |db| db.list_reactions()).await?;
    Ok(Json(rows.into_iter().filter_map(reaction_from_row).collect()))
}

/// POST /reactions: plain insert. Toggling is decided by the caller, and a
/// second insert for the same (story, user, type) is stored as another row.
pub async fn create_reaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewReaction>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.user_id != claims.sub {
        warn!("User {} tried to react as {}", claims.sub, req.user_id);
        return Err(StatusCode::FORBIDDEN);
    }

    let reaction = Reaction {
        id: Uuid::new_v4(),
        story_id: req.story_id,
        user_id: req.user_id,
        reaction_type: req.reaction_type,
    };

    let row = ReactionRow {
        id: reaction.id.to_string(),
        story_id: reaction.story_id.to_string(),
        user_id: reaction.user_id.to_string(),
        reaction_type: reaction.reaction_type.as_str().to_string(),
    };
    let inserted = run_db(&state, move |db| {
        if !db.story_exists(&row.story_id)? {
            return Ok(false);
        }
        db.insert_reaction(&row)?;
        Ok(true)
    })
    .await?;

    if !inserted {
        return Err(StatusCode::NOT_FOUND);
    }

    debug!(
        "Reaction {} ({}) added to story {}",
        reaction.id, reaction.reaction_type, reaction.story_id
    );
    Ok((StatusCode::CREATED, Json(reaction)))
}

pub async fn delete_reaction(
    State(state): State<AppState>,
    Path(reaction_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, StatusCode> {
    let id = reaction_id.to_string();
    let existing = run_db(&state, move |db| db.get_reaction(&id))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;

    if existing.user_id != claims.sub.to_string() {
        warn!("User {} tried to remove reaction {} owned by {}", claims.sub, reaction_id, existing.user_id);
        return Err(StatusCode::FORBIDDEN);
    }

    let id = reaction_id.to_string();
    if !run_db(&state, move |db| db.delete_reaction(&id)).await? {
        // removed concurrently between lookup and delete
        return Err(StatusCode::NOT_FOUND);
    }

    debug!("Reaction {} removed", reaction_id);
    Ok(StatusCode::NO_CONTENT)
}
