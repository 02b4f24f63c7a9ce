use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::history::{HistoryStore, StoreFuture};
use crate::models::{ChatMessage, ChatSession};

const SESSION_COLUMNS: &str = "id, user_id, category, title, messages, created_at, updated_at";

impl Store {
    pub async fn latest_chat_session(
        &self,
        user_id: Uuid,
        category: &str,
    ) -> Result<Option<ChatSession>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM chat_sessions
             WHERE user_id = $1
               AND category = $2
             ORDER BY updated_at DESC
             LIMIT 1"
        ))
        .bind(user_id)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    pub async fn insert_chat_session(&self, session: &ChatSession) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, user_id, category, title, messages, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.category)
        .bind(&session.title)
        .bind(Json(&session.messages))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_chat_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<ChatSession>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM chat_sessions
             WHERE id = $1
               AND user_id = $2"
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    pub async fn update_chat_session(&self, session: &ChatSession) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE chat_sessions
             SET title = $3,
                 messages = $4,
                 updated_at = $5
             WHERE id = $1
               AND user_id = $2",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.title)
        .bind(Json(&session.messages))
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::InvalidData(format!(
                "chat session {} does not exist",
                session.id
            )));
        }

        Ok(())
    }

    pub async fn list_chat_sessions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ChatSession>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS}
             FROM chat_sessions
             WHERE user_id = $1
             ORDER BY updated_at DESC
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    pub async fn delete_chat_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM chat_sessions
             WHERE id = $1
               AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl HistoryStore for Store {
    fn latest_session<'a>(
        &'a self,
        user_id: Uuid,
        category: &'a str,
    ) -> StoreFuture<'a, Option<ChatSession>> {
        Box::pin(self.latest_chat_session(user_id, category))
    }

    fn insert_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()> {
        Box::pin(self.insert_chat_session(session))
    }

    fn find_session<'a>(
        &'a self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> StoreFuture<'a, Option<ChatSession>> {
        Box::pin(self.find_chat_session(user_id, session_id))
    }

    fn update_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()> {
        Box::pin(self.update_chat_session(session))
    }

    fn list_sessions<'a>(
        &'a self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ChatSession>> {
        Box::pin(self.list_chat_sessions(user_id, limit))
    }

    fn delete_session<'a>(&'a self, user_id: Uuid, session_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(self.delete_chat_session(user_id, session_id))
    }
}

fn session_from_row(row: &PgRow) -> Result<ChatSession, StoreError> {
    let messages: Json<Vec<ChatMessage>> = row.try_get("messages").map_err(|err| {
        StoreError::InvalidData(format!("chat session messages invalid: {err}"))
    })?;

    Ok(ChatSession {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        category: row.try_get("category")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        title: row.try_get("title")?,
        messages: messages.0,
    })
}
