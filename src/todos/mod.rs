//! Todos — model, store, REST routes and the WebSocket change feed.

pub mod model;
pub mod routes;
pub mod store;
pub mod ws;

pub use model::{NewTodo, Todo, TodoUpdate, TodoWsMessage};
pub use store::TodoStore;
