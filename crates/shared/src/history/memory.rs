use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::{HistoryStore, StoreFuture};
use crate::models::ChatSession;
use crate::repos::StoreError;

/// In-process session store with the same ownership and ordering rules as the
/// Postgres store.
#[derive(Default)]
pub struct MemoryHistoryStore {
    sessions: Mutex<Vec<ChatSession>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn latest_session<'a>(
        &'a self,
        user_id: Uuid,
        category: &'a str,
    ) -> StoreFuture<'a, Option<ChatSession>> {
        Box::pin(async move {
            let sessions = self.sessions.lock().await;
            Ok(sessions
                .iter()
                .filter(|session| session.user_id == user_id && session.category == category)
                .max_by_key(|session| session.updated_at)
                .cloned())
        })
    }

    fn insert_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            if sessions.iter().any(|existing| existing.id == session.id) {
                return Err(StoreError::InvalidData(format!(
                    "chat session {} already exists",
                    session.id
                )));
            }
            sessions.push(session.clone());
            Ok(())
        })
    }

    fn find_session<'a>(
        &'a self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> StoreFuture<'a, Option<ChatSession>> {
        Box::pin(async move {
            let sessions = self.sessions.lock().await;
            Ok(sessions
                .iter()
                .find(|session| session.id == session_id && session.user_id == user_id)
                .cloned())
        })
    }

    fn update_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            let existing = sessions
                .iter_mut()
                .find(|existing| existing.id == session.id && existing.user_id == session.user_id)
                .ok_or_else(|| {
                    StoreError::InvalidData(format!("chat session {} does not exist", session.id))
                })?;
            existing.title = session.title.clone();
            existing.messages = session.messages.clone();
            existing.updated_at = session.updated_at;
            Ok(())
        })
    }

    fn list_sessions<'a>(
        &'a self,
        user_id: Uuid,
        limit: usize,
    ) -> StoreFuture<'a, Vec<ChatSession>> {
        Box::pin(async move {
            let sessions = self.sessions.lock().await;
            let mut owned = sessions
                .iter()
                .filter(|session| session.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>();
            owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            owned.truncate(limit);
            Ok(owned)
        })
    }

    fn delete_session<'a>(&'a self, user_id: Uuid, session_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            let before = sessions.len();
            sessions.retain(|session| !(session.id == session_id && session.user_id == user_id));
            Ok(sessions.len() != before)
        })
    }
}
