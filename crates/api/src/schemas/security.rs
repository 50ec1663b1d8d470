//! Token and user schemas.

use quill_core::types::DbId;
use quill_db::models::user::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::content::ContentData;
use super::trimmed;
use crate::response::Envelope;

pub const USER_RETRIEVED: &str = "user retrieved successfully";
pub const TOKEN_TYPE: &str = "bearer";

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenData {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

pub type TokenResponse = Envelope<TokenData>;

/// Body of `POST /refresh_token`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RefreshToken {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "refresh_token must not be empty"))]
    pub refresh_token: String,
}

/// OAuth2 password-grant form posted to `POST /token`.
///
/// Other standard grant fields (`grant_type`, `scope`, ...) are accepted
/// and ignored.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// User as returned to clients, with the content they own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserData {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub username: String,
    pub disabled: bool,
    pub superuser: bool,
    #[serde(default)]
    pub contents: Vec<ContentData>,
}

impl UserData {
    pub fn new(user: User, contents: Vec<ContentData>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            disabled: user.disabled,
            superuser: user.superuser,
            contents,
        }
    }
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self::new(user, Vec::new())
    }
}

pub type UserResponse = Envelope<UserData>;

impl UserResponse {
    pub fn from_user(user: User, contents: Vec<ContentData>) -> Self {
        Envelope::success_with_message(UserData::new(user, contents), USER_RETRIEVED)
    }
}

/// Body of `POST /user/`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserCreate {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 64, message = "username must be 1 to 64 characters"))]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub superuser: bool,
    #[serde(default)]
    pub disabled: bool,
}

/// Body of `PATCH /user/{id}/password`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserPasswordPatch {
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        must_match(other = "password_confirm", message = "passwords don't match")
    )]
    pub password: String,
    #[serde(deserialize_with = "trimmed")]
    pub password_confirm: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{to_envelope, AppError};

    #[test]
    fn token_data_is_bearer() {
        let data = TokenData::bearer("a".into(), "r".into());
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"access_token": "a", "refresh_token": "r", "token_type": "bearer"})
        );
    }

    #[test]
    fn user_create_defaults_flags_and_trims() {
        let body: UserCreate =
            serde_json::from_value(json!({"username": " alice ", "password": "long-enough"}))
                .unwrap();
        assert_eq!(body.username, "alice");
        assert!(!body.superuser);
        assert!(!body.disabled);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn user_create_rejects_short_password() {
        let body: UserCreate =
            serde_json::from_value(json!({"username": "alice", "password": "short"})).unwrap();
        let errors = body.validate().unwrap_err();
        let env = to_envelope(&AppError::from_validation(&errors, "body"));
        assert_eq!(env.code, 400);
        assert_eq!(
            env.message,
            "request parameter validation failed: body -> password: password must be at least 8 characters"
        );
    }

    #[test]
    fn user_create_rejects_unknown_fields() {
        let result = serde_json::from_value::<UserCreate>(
            json!({"username": "a", "password": "long-enough", "admin": true}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn password_patch_requires_matching_confirmation() {
        let body: UserPasswordPatch = serde_json::from_value(
            json!({"password": "new-password", "password_confirm": "other-password"}),
        )
        .unwrap();
        let errors = body.validate().unwrap_err();
        let env = to_envelope(&AppError::from_validation(&errors, "body"));
        assert_eq!(
            env.message,
            "request parameter validation failed: body -> password: passwords don't match"
        );
    }

    #[test]
    fn login_form_ignores_grant_fields() {
        let form: LoginForm = serde_json::from_value(
            json!({"username": "alice", "password": "pw", "grant_type": "password", "scope": ""}),
        )
        .unwrap();
        assert_eq!(form.username, "alice");
    }
}
