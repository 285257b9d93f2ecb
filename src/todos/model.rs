//! Todo data model — records, request bodies, and change-feed messages.

use serde::{Deserialize, Serialize};

/// Department assigned to todos created without one.
pub const DEFAULT_DEPARTMENT: &str = "General";

/// A single to-do item as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned id, `max(existing) + 1`.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// Older files predate departments, so the key may be missing or null.
    #[serde(default)]
    pub department: Option<String>,
}

/// Body of `POST /api/todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    #[serde(default)]
    pub department: Option<String>,
}

impl NewTodo {
    /// Build the stored record for this request under the given id.
    pub fn into_todo(self, id: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            is_completed: self.is_completed,
            department: Some(
                self.department
                    .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            ),
        }
    }
}

/// Body of `PUT /api/todos/{id}`: the full todo shape.
///
/// `id` is accepted for symmetry with [`Todo`] but ignored; the path wins.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoUpdate {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// `None` leaves the stored department unchanged.
    #[serde(default)]
    pub department: Option<String>,
}

impl TodoUpdate {
    /// Overwrite `todo` in place.
    pub fn apply_to(self, todo: &mut Todo) {
        todo.title = self.title;
        todo.description = self.description;
        todo.is_completed = self.is_completed;
        if let Some(dept) = self.department {
            todo.department = Some(dept);
        }
    }
}

/// Messages pushed over the `/ws/todos` change feed (server → client).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TodoWsMessage {
    /// Full collection, sent on connect and after a lag.
    TodosSync { todos: Vec<Todo> },
    TodoCreated { todo: Todo },
    TodoUpdated { todo: Todo },
    /// Carries the removed record, matching the DELETE response.
    TodoDeleted { todo: Todo },
}
