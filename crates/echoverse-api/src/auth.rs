use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use echoverse_db::Database;
use echoverse_types::api::{Claims, CurrentSession, LoginRequest, RegisterRequest, SessionResponse};

use crate::run_db;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    let name_len = req.username.chars().count();
    if !(3..=32).contains(&name_len) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Check if username is taken
    let username = req.username.clone();
    if run_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let user_id = Uuid::new_v4();
    let username = req.username.clone();
    let created = run_db(&state, move |db| {
        db.create_user(&user_id.to_string(), &username, &password_hash)
    })
    .await?;

    // Taken by a registration that finished while this one was hashing
    if !created {
        return Err(StatusCode::CONFLICT);
    }

    info!("Registered user {} ({})", req.username, user_id);

    let session = open_session(&state, user_id, req.username).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let username = req.username.clone();
    let user = run_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: Uuid = user.id.parse().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let session = open_session(&state, user_id, user.username).await?;
    Ok(Json(session))
}

/// GET /auth/session: who the bearer token belongs to.
pub async fn current_session(Extension(claims): Extension<Claims>) -> Json<CurrentSession> {
    Json(CurrentSession {
        user_id: claims.sub,
        username: claims.username,
    })
}

/// POST /auth/logout: revokes the session row behind the token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, StatusCode> {
    let sid = claims.sid.to_string();
    run_db(&state, move |db| db.delete_session(&sid)).await?;
    info!("User {} signed out", claims.username);
    Ok(StatusCode::NO_CONTENT)
}

async fn open_session(
    state: &AppState,
    user_id: Uuid,
    username: String,
) -> Result<SessionResponse, StatusCode> {
    let session_id = Uuid::new_v4();
    run_db(state, move |db| {
        db.create_session(&session_id.to_string(), &user_id.to_string())
    })
    .await?;

    let token = create_token(&state.jwt_secret, user_id, session_id, &username).map_err(|e| {
        error!("Failed to sign token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(SessionResponse {
        user_id,
        username,
        token,
    })
}

fn create_token(secret: &str, user_id: Uuid, session_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        sid: session_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
