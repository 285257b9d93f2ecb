//! Backend trait — the whole-collection load/persist seam behind the todo store.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::todos::model::Todo;

/// Storage for the full todo collection.
///
/// Backends never see individual operations: callers load everything,
/// mutate in memory, and persist everything back.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Load the full collection in storage order.
    async fn load(&self) -> Result<Vec<Todo>, StoreError>;

    /// Replace the stored collection with `todos`.
    async fn persist(&self, todos: &[Todo]) -> Result<(), StoreError>;
}
