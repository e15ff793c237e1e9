//! In-memory `TodoStore` for router tests.
//!
//! One mutex guards the whole table, so each call is atomic the same way a
//! single SQL statement is. Ids come from a counter that is never rewound.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::Mutex;

use crate::{
    models::{Todo, TodoId},
    repository::{StoreError, StoreResult, TodoStore},
};

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Todo>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
    down: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail, including `ping`.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Todo> {
        self.table.lock().await.rows.values().cloned().collect()
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl TodoStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Todo>> {
        self.enter()?;
        Ok(self.snapshot().await)
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.enter()?;
        Ok(self.table.lock().await.rows.get(&id.get()).cloned())
    }

    async fn create(&self, text: &str) -> StoreResult<Todo> {
        self.enter()?;
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let todo = Todo {
            id: table.last_id,
            text: text.to_string(),
            completed: false,
        };
        table.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update_text(&self, id: TodoId, text: &str) -> StoreResult<Option<Todo>> {
        self.enter()?;
        let mut table = self.table.lock().await;
        Ok(table.rows.get_mut(&id.get()).map(|todo| {
            todo.text = text.to_string();
            todo.clone()
        }))
    }

    async fn toggle(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.enter()?;
        let mut table = self.table.lock().await;
        Ok(table.rows.get_mut(&id.get()).map(|todo| {
            todo.completed = !todo.completed;
            todo.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        self.enter()?;
        Ok(self.table.lock().await.rows.remove(&id.get()).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.enter()
    }
}
