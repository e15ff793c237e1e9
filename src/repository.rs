//! Storage seam between the HTTP handlers and the datastore.
//!
//! Each method maps to exactly one statement against the `todos` table, so
//! every operation is atomic at the datastore by construction. Handlers are
//! generic over [`TodoStore`]; the process wires in the Postgres-backed
//! [`Db`](crate::db::driver::Db) and tests use an in-memory store.

use std::future::Future;

use crate::models::{Todo, TodoId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("datastore unavailable")]
    Unavailable,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TodoStore: Send + Sync + 'static {
    /// All rows, ascending by id.
    fn list(&self) -> impl Future<Output = StoreResult<Vec<Todo>>> + Send;

    fn get(&self, id: TodoId) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    /// Inserts a row with `completed = false`; the datastore assigns the id.
    fn create(&self, text: &str) -> impl Future<Output = StoreResult<Todo>> + Send;

    /// Replaces `text` only. `Ok(None)` when no row has this id.
    fn update_text(
        &self,
        id: TodoId,
        text: &str,
    ) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    /// Flips `completed` from its persisted value in a single statement.
    /// Must never be written as a read followed by a write.
    fn toggle(&self, id: TodoId) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;

    /// Returns whether a row was removed.
    fn delete(&self, id: TodoId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Liveness probe.
    fn ping(&self) -> impl Future<Output = StoreResult<()>> + Send;
}
