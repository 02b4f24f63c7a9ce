use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use crate::models::ChatSession;
use crate::repos::StoreError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Persistence seam for chat sessions. Every lookup is scoped by owner.
pub trait HistoryStore: Send + Sync {
    /// Most recently updated session of `user_id` in `category`.
    fn latest_session<'a>(
        &'a self,
        user_id: Uuid,
        category: &'a str,
    ) -> StoreFuture<'a, Option<ChatSession>>;

    fn insert_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()>;

    fn find_session<'a>(
        &'a self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> StoreFuture<'a, Option<ChatSession>>;

    /// Persists title, messages and `updated_at` of an existing session.
    fn update_session<'a>(&'a self, session: &'a ChatSession) -> StoreFuture<'a, ()>;

    /// Sessions of `user_id`, most recently updated first.
    fn list_sessions<'a>(&'a self, user_id: Uuid, limit: usize)
    -> StoreFuture<'a, Vec<ChatSession>>;

    /// Returns whether a row was removed.
    fn delete_session<'a>(&'a self, user_id: Uuid, session_id: Uuid) -> StoreFuture<'a, bool>;
}
