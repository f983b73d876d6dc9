use axum::{Json, extract::State, http::StatusCode};

use echoverse_types::models::Profile;

use crate::auth::AppState;
use crate::convert::profile_from_row;
use crate::run_db;

pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, StatusCode> {
    let rows = run_db(&state, |db| db.list_profiles()).await?;
    Ok(Json(rows.into_iter().map(profile_from_row).collect()))
}
