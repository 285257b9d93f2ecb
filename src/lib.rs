//! Todo API — CRUD over todo items backed by a JSON file or memory.

pub mod app;
pub mod config;
pub mod error;
pub mod store;
pub mod todos;
