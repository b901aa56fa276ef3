//! Registration, login and session handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tally_core::models::{NewUser, User};
use tally_core::{PasswordHash, ValidatedPassword};

use super::{core_error, non_blank, MessageResponse};
use crate::session::{clear_session, current_user, set_session};
use crate::{AppError, AppState};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

/// POST /api/auth/register - Create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, PrivateCookieJar, Json<AuthResponse>), AppError> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(&req.username),
        non_blank(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("All fields are required"));
    };

    let new_user = NewUser::new(username, email).map_err(core_error)?;
    let password = ValidatedPassword::new(password).map_err(core_error)?;

    let cost = state.config.password_cost;
    let hash = tokio::task::spawn_blocking(move || PasswordHash::new(password, cost)).await??;

    // Duplicate email or username is a plain validation failure for the client
    let user = state
        .db
        .create_user(&new_user, &hash)
        .map_err(|e| match e {
            tally_core::Error::Conflict(msg) => AppError::bad_request(&msg),
            other => core_error(other),
        })?;

    info!(user_id = user.id, "User registered");

    let jar = set_session(
        jar,
        user.id,
        state.config.session_duration,
        state.config.secure_cookies,
    );

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// POST /api/auth/login - Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<AuthResponse>), AppError> {
    let (Some(email), Some(password)) = (
        non_blank(&req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Email and password are required"));
    };

    let Some((user, hash)) = state.db.get_user_credentials(email)? else {
        warn!("Login attempt for unknown email");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    let matches = tokio::task::spawn_blocking(move || hash.verify(&password)).await??;
    if !matches {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = user.id, "User logged in");

    let jar = set_session(
        jar,
        user.id,
        state.config.session_duration,
        state.config.secure_cookies,
    );

    Ok((
        jar,
        Json(AuthResponse {
            message: "Logged in successfully".to_string(),
            user,
        }),
    ))
}

/// POST /api/auth/logout - End the current session
pub async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<MessageResponse>) {
    (
        clear_session(jar, state.config.secure_cookies),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// GET /api/auth/me - The logged-in user
pub async fn get_me(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<Json<MeResponse>, AppError> {
    let user = current_user(&state, &jar)?
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
    Ok(Json(MeResponse { user }))
}
