use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ChatMessage, ChatRole, ChatSession};
use crate::repos::StoreError;

pub mod memory;
pub mod store;

pub use memory::MemoryHistoryStore;
pub use store::{HistoryStore, StoreFuture};

pub const NEW_SESSION_TITLE: &str = "New chat";
pub const SESSION_REUSE_WINDOW_MINUTES: i64 = 30;
pub const SESSION_LIST_LIMIT: usize = 50;
const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("chat session not found")]
    SessionNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Chat history operations scoped to a user. Time is passed in by the caller.
#[derive(Clone)]
pub struct HistoryManager {
    store: Arc<dyn HistoryStore>,
}

impl HistoryManager {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Reuses the latest session of the category when it was touched within the
    /// reuse window, otherwise starts a new one.
    pub async fn get_or_create_session(
        &self,
        user_id: Uuid,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, HistoryError> {
        if let Some(latest) = self.store.latest_session(user_id, category).await?
            && now - latest.updated_at < Duration::minutes(SESSION_REUSE_WINDOW_MINUTES)
        {
            debug!(session_id = %latest.id, category, "reusing recent chat session");
            return Ok(latest.id);
        }

        self.create_session(user_id, category, now).await
    }

    pub async fn create_session(
        &self,
        user_id: Uuid,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, HistoryError> {
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            category: category.to_string(),
            created_at: now,
            updated_at: now,
            title: NEW_SESSION_TITLE.to_string(),
            messages: Vec::new(),
        };
        self.store.insert_session(&session).await?;
        debug!(session_id = %session.id, category, "created chat session");
        Ok(session.id)
    }

    pub async fn append_message(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        message: ChatMessage,
        now: DateTime<Utc>,
    ) -> Result<(), HistoryError> {
        let mut session = self
            .store
            .find_session(user_id, session_id)
            .await?
            .ok_or(HistoryError::SessionNotFound)?;

        if session.messages.is_empty() && message.role == ChatRole::User {
            session.title = derive_title(&message.text);
        }
        session.updated_at = now.max(message.timestamp);
        session.messages.push(message);

        self.store.update_session(&session).await?;
        Ok(())
    }

    pub async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, HistoryError> {
        Ok(self.store.list_sessions(user_id, SESSION_LIST_LIMIT).await?)
    }

    pub async fn get_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<ChatSession, HistoryError> {
        self.store
            .find_session(user_id, session_id)
            .await?
            .ok_or(HistoryError::SessionNotFound)
    }

    /// Idempotent: deleting a missing or foreign session is not an error.
    pub async fn delete_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), HistoryError> {
        let deleted = self.store.delete_session(user_id, session_id).await?;
        if deleted {
            debug!(%session_id, "deleted chat session");
        }
        Ok(())
    }
}

/// First 50 characters of the first user message, with "..." when cut.
pub fn derive_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let truncated = text.chars().take(TITLE_MAX_CHARS).collect::<String>();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
