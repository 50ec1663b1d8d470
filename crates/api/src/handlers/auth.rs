//! Handlers for token issue (`/token`, `/refresh_token`).

use axum::extract::State;
use quill_core::error::CoreError;
use quill_db::models::user::User;
use quill_db::repositories::UserRepo;

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, validate_token, JwtConfig, Subject, TokenScope,
};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedForm, ValidatedJson};
use crate::middleware::auth::{ensure_active, INVALID_CREDENTIALS};
use crate::response::Envelope;
use crate::schemas::security::{LoginForm, RefreshToken, TokenData, TokenResponse};
use crate::state::AppState;

/// POST /api/v1/token
///
/// OAuth2 password grant. Returns an access and refresh token pair.
#[utoipa::path(
    post,
    path = "/api/v1/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Envelope with a token pair; code 401 on bad credentials", body = TokenData)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<TokenResponse> {
    let bad_credentials =
        || AppError::Core(CoreError::Unauthorized("Incorrect username or password".into()));

    let user = UserRepo::find_by_username(&state.pool, &form.username)
        .await?
        .ok_or_else(bad_credentials)?;

    let valid = verify_password(&form.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(username = %form.username, "Failed login attempt");
        return Err(bad_credentials());
    }
    ensure_active(&user)?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Envelope::success(issue_token_pair(&user, &state.config.jwt)?))
}

/// POST /api/v1/refresh_token
///
/// Exchange a valid refresh token for a fresh token pair.
#[utoipa::path(
    post,
    path = "/api/v1/refresh_token",
    request_body = RefreshToken,
    responses(
        (status = 200, description = "Envelope with a new token pair; code 401 on an invalid token", body = TokenData)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RefreshToken>,
) -> AppResult<TokenResponse> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let claims = validate_token(&input.refresh_token, TokenScope::Refresh, &state.config.jwt)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected refresh token");
            invalid()
        })?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(invalid)?;
    ensure_active(&user)?;

    Ok(Envelope::success(issue_token_pair(&user, &state.config.jwt)?))
}

fn issue_token_pair(user: &User, config: &JwtConfig) -> AppResult<TokenData> {
    let subject = Subject {
        user_id: user.id,
        username: &user.username,
        superuser: user.superuser,
    };
    let to_internal = |e: jsonwebtoken::errors::Error| {
        AppError::Internal(format!("Token generation error: {e}"))
    };

    let access = generate_access_token(subject, config).map_err(to_internal)?;
    let refresh = generate_refresh_token(subject, config).map_err(to_internal)?;
    Ok(TokenData::bearer(access, refresh))
}
