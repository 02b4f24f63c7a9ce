use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::{Store, StoreError, is_unique_violation};
use crate::models::User;

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
}

impl Store {
    /// Fails with `StoreError::Conflict` when the email is taken, ignoring case.
    pub async fn create_user(
        &self,
        new_user: NewUser<'_>,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, phone, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, email, name, password_hash, phone, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_user.email)
        .bind(new_user.name)
        .bind(new_user.password_hash)
        .bind(new_user.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Conflict("user email".to_string())
            } else {
                StoreError::Database(err)
            }
        })?;

        user_from_row(&row)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, phone, created_at
             FROM users
             WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, phone, created_at
             FROM users
             WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// `None` leaves a column unchanged; `Some(None)` clears the phone.
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        phone: Option<Option<&str>>,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "UPDATE users
             SET name = COALESCE($2, name),
                 phone = CASE WHEN $3 THEN $4 ELSE phone END
             WHERE id = $1
             RETURNING id, email, name, password_hash, phone, created_at",
        )
        .bind(user_id)
        .bind(name)
        .bind(phone.is_some())
        .bind(phone.flatten())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
    })
}
