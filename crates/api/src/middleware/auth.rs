//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quill_core::error::CoreError;
use quill_core::types::DbId;
use quill_db::models::user::User;
use quill_db::repositories::UserRepo;

use crate::auth::jwt::{validate_token, TokenScope};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Message returned for every authentication failure.
pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

pub const INACTIVE_USER: &str = "Inactive user";

/// Authenticated caller, taken from an access token in the `Authorization`
/// header.
///
/// The token only names the account. Identity and role are read from the
/// current `users` row on every request.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
    pub superuser: bool,
    pub account: User,
}

impl From<User> for AuthUser {
    fn from(account: User) -> Self {
        Self {
            user_id: account.id,
            username: account.username.clone(),
            superuser: account.superuser,
            account,
        }
    }
}

fn unauthorized() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

/// Reject disabled accounts with a 400.
pub fn ensure_active(user: &User) -> AppResult<()> {
    if user.disabled {
        return Err(AppError::Core(CoreError::Validation(INACTIVE_USER.into())));
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        let claims = validate_token(token, TokenScope::Access, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            unauthorized()
        })?;

        let account = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = claims.sub, "Access token for a missing account");
                unauthorized()
            })?;
        ensure_active(&account)?;

        Ok(AuthUser::from(account))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn account(disabled: bool) -> User {
        User {
            id: 7,
            username: "dora".into(),
            password_hash: String::new(),
            superuser: true,
            disabled,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn identity_comes_from_the_account_row() {
        let auth = AuthUser::from(account(false));
        assert_eq!(auth.user_id, 7);
        assert_eq!(auth.username, "dora");
        assert!(auth.superuser);
    }

    #[test]
    fn disabled_account_is_inactive() {
        assert!(ensure_active(&account(false)).is_ok());
        assert_matches!(
            ensure_active(&account(true)),
            Err(AppError::Core(CoreError::Validation(msg))) if msg == INACTIVE_USER
        );
    }
}
