use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RegisterRequest, User};
use crate::repos::{NewUser, Store, StoreError};

const HASH_SCHEME: &str = "sha256";
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{message}")]
    InvalidInput {
        code: &'static str,
        message: &'static str,
    },
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => Self::EmailTaken,
            other => Self::Store(other),
        }
    }
}

pub async fn register(
    store: &Store,
    req: &RegisterRequest,
    now: DateTime<Utc>,
) -> Result<User, AccountError> {
    let email = req.email.trim();
    let name = req.name.trim();
    validate_registration(email, name, &req.password)?;

    if store.find_user_by_email(email).await?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let password_hash = hash_password(&req.password);
    let phone = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty());

    let user = store
        .create_user(
            NewUser {
                email,
                name,
                password_hash: &password_hash,
                phone,
            },
            now,
        )
        .await?;

    Ok(user)
}

pub async fn authenticate(store: &Store, email: &str, password: &str) -> Result<User, AccountError> {
    let user = store
        .find_user_by_email(email.trim())
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AccountError::InvalidCredentials);
    }

    Ok(user)
}

/// An empty name keeps the current one; a present phone replaces it and a
/// blank phone clears it.
pub async fn update_profile(
    store: &Store,
    user_id: Uuid,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<User, AccountError> {
    let name = name.map(str::trim).filter(|name| !name.is_empty());
    let phone = phone_update(phone);

    store
        .update_user_profile(user_id, name, phone)
        .await?
        .ok_or(AccountError::UserNotFound)
}

fn phone_update(phone: Option<&str>) -> Option<Option<&str>> {
    phone.map(|phone| Some(phone.trim()).filter(|phone| !phone.is_empty()))
}

fn validate_registration(email: &str, name: &str, password: &str) -> Result<(), AccountError> {
    if email.is_empty() || !email.contains('@') {
        return Err(AccountError::InvalidInput {
            code: "invalid_email",
            message: "A valid email is required",
        });
    }
    if name.is_empty() {
        return Err(AccountError::InvalidInput {
            code: "invalid_name",
            message: "Name is required",
        });
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AccountError::InvalidInput {
            code: "invalid_password",
            message: "Password must be at least 6 characters",
        });
    }
    Ok(())
}

/// Salted SHA-256, encoded as `sha256$<salt>$<base64 digest>`.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = salted_digest(&salt, password);
    format!("{HASH_SCHEME}${salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(HASH_SCHEME), Some(salt), Some(digest)) => salted_digest(salt, password) == digest,
        _ => false,
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::{
        AccountError, hash_password, phone_update, validate_registration, verify_password,
    };

    #[test]
    fn password_round_trips_and_rejects_wrong_input() {
        let stored = hash_password("secret-pass");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("secret-pass", &stored));
        assert!(!verify_password("secret-pasS", &stored));
        assert!(!verify_password("secret-pass", "plain-text"));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn registration_requires_email_name_and_password() {
        assert!(validate_registration("owner@shop.ru", "Анна", "123456").is_ok());
        assert!(matches!(
            validate_registration("owner", "Анна", "123456"),
            Err(AccountError::InvalidInput { code: "invalid_email", .. })
        ));
        assert!(matches!(
            validate_registration("owner@shop.ru", "", "123456"),
            Err(AccountError::InvalidInput { code: "invalid_name", .. })
        ));
        assert!(matches!(
            validate_registration("owner@shop.ru", "Анна", "12345"),
            Err(AccountError::InvalidInput { code: "invalid_password", .. })
        ));
    }

    #[test]
    fn blank_phone_clears_and_absent_phone_keeps() {
        assert_eq!(phone_update(None), None);
        assert_eq!(phone_update(Some("   ")), Some(None));
        assert_eq!(phone_update(Some(" +7 900 ")), Some(Some("+7 900")));
    }
}
