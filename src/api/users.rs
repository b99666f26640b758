//! The older `/users` account endpoints. Same store and tokens as `/auth`,
//! different field names.

use axum::{extract::State, http::StatusCode, Json};

use super::auth::{authenticate, change_account, find_caller, register, AuthUser};
use super::error::{ApiError, ApiJson};
use super::types::*;
use crate::server::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LegacySignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    // Nickname was optional here.
    let nick = non_empty(req.nick).or_else(|| req.id.clone());
    register(&state, req.id, req.pw, nick).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signup complete".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LegacyLoginRequest>,
) -> Result<Json<LegacyTokenResponse>, ApiError> {
    let (_, token) = authenticate(&state, req.id, req.pw).await?;
    Ok(Json(LegacyTokenResponse { token }))
}

pub async fn protected(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<LegacyAccountResponse>, ApiError> {
    let user = find_caller(&state, &user_id).await?;
    Ok(Json(LegacyAccountResponse {
        message: "Authenticated".to_string(),
        id: user.id,
        nick: user.nickname,
    }))
}

/// Unlike `/auth/update`, the current password is always required.
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<LegacyUpdateRequest>,
) -> Result<Json<LegacyAccountResponse>, ApiError> {
    let current_pw = req.current_pw.filter(|pw| !pw.is_empty());
    if current_pw.is_none() {
        // Unknown user still wins over a missing password.
        find_caller(&state, &user_id).await?;
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let user = change_account(&state, &user_id, req.nick, current_pw, req.pw).await?;
    Ok(Json(LegacyAccountResponse {
        message: "Updated".to_string(),
        id: user.id,
        nick: user.nickname,
    }))
}
