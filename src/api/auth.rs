use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::{debug, info};

use super::error::{ApiError, ApiJson};
use super::types::*;
use crate::db::{DbError, User};
use crate::security::{hash_password, verify_password};
use crate::server::AppState;

/// Verified caller id, stored in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

/// Also copied onto the response, where the request log picks it up.
pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let caller = state.tokens.resolve_caller_id(req.headers()).map(CallerId);
    if let Some(caller) = &caller {
        req.extensions_mut().insert(caller.clone());
    }

    let mut response = next.run(req).await;
    if let Some(caller) = caller {
        response.extensions_mut().insert(caller);
    }
    response
}

/// Extractor for handlers that require a caller. Rejects with 401 before
/// any other extractor or lookup runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerId>()
            .map(|caller| AuthUser(caller.0.clone()))
            .ok_or_else(ApiError::unauthorized)
    }
}

pub(super) async fn register(
    state: &AppState,
    id: Option<String>,
    password: Option<String>,
    nickname: Option<String>,
) -> Result<User, ApiError> {
    let (Some(id), Some(password)) = (non_empty(id), non_empty(password)) else {
        return Err(ApiError::validation("id and password are required"));
    };
    let nickname = non_empty(nickname).ok_or_else(|| ApiError::validation("nickname is required"))?;

    if state.db.user_exists(&id).await? {
        return Err(id_taken());
    }

    let user = User {
        id,
        password_hash: hash_password(password, state.config.auth.bcrypt_cost).await?,
        nickname,
        created: Utc::now(),
    };
    state.db.insert_user(user.clone()).await.map_err(|e| match e {
        DbError::AlreadyExists { .. } => id_taken(),
        e => e.into(),
    })?;

    info!(user = %user.id, "New account");
    Ok(user)
}

/// Returns the user and a fresh access token, or 401 without saying which
/// half of the credentials was wrong.
pub(super) async fn authenticate(
    state: &AppState,
    id: Option<String>,
    password: Option<String>,
) -> Result<(User, String), ApiError> {
    let bad_credentials = || ApiError::Unauthorized("Invalid id or password".to_string());

    let (Some(id), Some(password)) = (id, password) else {
        return Err(bad_credentials());
    };
    let user = match state.db.get_user(&id).await {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => return Err(bad_credentials()),
        Err(e) => return Err(e.into()),
    };
    if !verify_password(password, user.password_hash.clone()).await? {
        debug!(user = %id, "Password mismatch");
        return Err(bad_credentials());
    }

    let token = state.tokens.issue(&user.id)?;
    Ok((user, token))
}

/// Nickname and password changes. A new password is only accepted with a
/// matching current one; a supplied current password is always checked.
pub(super) async fn change_account(
    state: &AppState,
    user_id: &str,
    nickname: Option<String>,
    current_pw: Option<String>,
    new_pw: Option<String>,
) -> Result<User, ApiError> {
    let user = find_caller(state, user_id).await?;

    let new_pw = non_empty(new_pw);
    let current_pw = current_pw.filter(|pw| !pw.is_empty());
    if new_pw.is_some() && current_pw.is_none() {
        return Err(wrong_password());
    }
    if let Some(current) = current_pw {
        if !verify_password(current, user.password_hash.clone()).await? {
            return Err(wrong_password());
        }
    }

    let password_hash = match new_pw {
        Some(pw) => Some(hash_password(pw.trim().to_string(), state.config.auth.bcrypt_cost).await?),
        None => None,
    };
    let nickname = non_empty(nickname).map(|n| n.trim().to_string());

    let user = state
        .db
        .update_user(
            user_id,
            Box::new(move |u| {
                if let Some(nickname) = nickname {
                    u.nickname = nickname;
                }
                if let Some(hash) = password_hash {
                    u.password_hash = hash;
                }
            }),
        )
        .await?;
    Ok(user)
}

pub(super) async fn find_caller(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    match state.db.get_user(user_id).await {
        Ok(user) => Ok(user),
        Err(DbError::NotFound(_)) => Err(ApiError::not_found("User")),
        Err(e) => Err(e.into()),
    }
}

fn id_taken() -> ApiError {
    ApiError::Conflict {
        message: "ID already in use".to_string(),
        id: None,
    }
}

fn wrong_password() -> ApiError {
    ApiError::Unauthorized("Current password is incorrect".to_string())
}

pub async fn check_id(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckIdRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = non_empty(req.id).ok_or_else(|| ApiError::validation("id is required"))?;

    if state.db.user_exists(&id).await? {
        return Err(id_taken());
    }
    Ok(Json(MessageResponse {
        message: "ID is available".to_string(),
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let user = register(&state, req.id, req.password, req.nickname).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse::from(&user))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (user, access_token) = authenticate(&state, req.id, req.password).await?;
    Ok(Json(LoginResponse {
        access_token,
        id: user.id,
        nickname: user.nickname,
    }))
}

pub async fn protected(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = find_caller(&state, &user_id).await?;
    Ok(Json(AccountResponse {
        id: user.id,
        nickname: user.nickname,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = change_account(&state, &user_id, req.nickname, req.current_pw, req.new_pw).await?;
    Ok(Json(AccountResponse {
        id: user.id,
        nickname: user.nickname,
    }))
}

/// Re-signs a still valid token. Without one the answer is a null token,
/// not an error.
pub async fn refresh(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access_token = match caller {
        Some(AuthUser(user_id)) => Some(state.tokens.issue(&user_id)?),
        None => None,
    };
    Ok(Json(RefreshResponse { access_token }))
}

pub async fn logout() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<OkResponse>, ApiError> {
    match state.db.delete_user(&user_id).await {
        Ok(_) => info!(user = %user_id, "Account deleted"),
        Err(DbError::NotFound(_)) => return Err(ApiError::not_found("User")),
        Err(e) => return Err(e.into()),
    }
    Ok(Json(OkResponse { ok: true }))
}
