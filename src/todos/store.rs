//! Todo store — CRUD over a backend with broadcast to change-feed clients.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use super::model::{NewTodo, Todo, TodoUpdate, TodoWsMessage};
use crate::error::StoreError;
use crate::store::TodoBackend;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// The todo collection and its operations.
///
/// Every call loads the full collection from the backend. Mutations hold
/// `write_lock` across load, mutate and persist so that concurrent requests
/// in this process cannot lose updates or reuse an id.
pub struct TodoStore {
    backend: Arc<dyn TodoBackend>,
    write_lock: Mutex<()>,
    tx: broadcast::Sender<TodoWsMessage>,
}

impl TodoStore {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            backend,
            write_lock: Mutex::new(()),
            tx,
        })
    }

    /// Subscribe to change events. Each change-feed client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<TodoWsMessage> {
        self.tx.subscribe()
    }

    /// All todos, or only those in `department`, in storage order.
    ///
    /// An empty filter string means no filter.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        let todos = self.backend.load().await?;
        Ok(match department.filter(|d| !d.is_empty()) {
            Some(dept) => todos
                .into_iter()
                .filter(|t| t.department.as_deref() == Some(dept))
                .collect(),
            None => todos,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        self.backend
            .load()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })
    }

    /// Append a new todo with the next id and return it.
    pub async fn create(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut todos = self.backend.load().await?;

        let id = next_id(&todos)?;
        let todo = new.into_todo(id);
        todos.push(todo.clone());
        self.backend.persist(&todos).await?;

        info!(id, title = %todo.title, backend = self.backend.name(), "Todo created");
        let _ = self.tx.send(TodoWsMessage::TodoCreated { todo: todo.clone() });
        Ok(todo)
    }

    /// Overwrite the todo with `id` and return the stored result.
    pub async fn update(&self, id: i64, update: TodoUpdate) -> Result<Todo, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut todos = self.backend.load().await?;

        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        if update.id.is_some_and(|body_id| body_id != id) {
            debug!(id, body_id = ?update.id, "Ignoring id in update body");
        }
        update.apply_to(todo);
        let updated = todo.clone();
        self.backend.persist(&todos).await?;

        info!(id, "Todo updated");
        let _ = self.tx.send(TodoWsMessage::TodoUpdated {
            todo: updated.clone(),
        });
        Ok(updated)
    }

    /// Remove the todo with `id` and return it.
    pub async fn delete(&self, id: i64) -> Result<Todo, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut todos = self.backend.load().await?;

        let index = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        let removed = todos.remove(index);
        self.backend.persist(&todos).await?;

        info!(id, "Todo deleted");
        let _ = self.tx.send(TodoWsMessage::TodoDeleted {
            todo: removed.clone(),
        });
        Ok(removed)
    }

    /// Distinct non-null departments in first-seen order.
    pub async fn departments(&self) -> Result<Vec<String>, StoreError> {
        let todos = self.backend.load().await?;
        let mut seen: Vec<String> = Vec::new();
        for dept in todos.into_iter().filter_map(|t| t.department) {
            if !seen.contains(&dept) {
                seen.push(dept);
            }
        }
        Ok(seen)
    }
}

/// `max(existing ids) + 1`, or 1 for an empty collection.
fn next_id(todos: &[Todo]) -> Result<i64, StoreError> {
    let max_id = todos.iter().map(|t| t.id).max().unwrap_or(0);
    max_id
        .checked_add(1)
        .ok_or(StoreError::IdsExhausted { max_id })
}
