//! In-process backend holding the collection in a `Vec`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::TodoBackend;
use crate::error::StoreError;
use crate::todos::model::Todo;

/// Process-local todo list. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryBackend {
    todos: RwLock<Vec<Todo>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with an existing collection.
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos: RwLock::new(todos),
        }
    }
}

#[async_trait]
impl TodoBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.clone())
    }

    async fn persist(&self, todos: &[Todo]) -> Result<(), StoreError> {
        *self.todos.write().await = todos.to_vec();
        Ok(())
    }
}
