use serde::{Deserialize, Serialize};

use crate::constants::{
    ERR_PASSWORD_LENGTH, ERR_USERNAME_COLON, ERR_USERNAME_LENGTH, MAX_USERNAME_LENGTH,
    MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, Result};

/// Metadata attached to a Users entry; the entry value itself is empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub id: String,
    /// PBKDF2 digest string, see [`crate::security::hash_password`]
    pub password: String,
}

/// Public view of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfView {
    pub id: String,
    pub username: String,
}

/// Body of signup and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    pub password: Option<String>,
}

/// Usernames become the first segment of a Users key, so they must be
/// 1..=20 characters and never contain the `:` separator.
pub fn validate_username(username: &str) -> Result<()> {
    let length = username.chars().count();
    if length == 0 || length > MAX_USERNAME_LENGTH {
        return Err(AppError::invalid(ERR_USERNAME_LENGTH));
    }
    if username.contains(':') {
        return Err(AppError::invalid(ERR_USERNAME_COLON));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid(ERR_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Treat an absent field and an empty string alike
pub(crate) fn required(field: Option<String>, missing: &str) -> Result<String> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::invalid(missing))
}
