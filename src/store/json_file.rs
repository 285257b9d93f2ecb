//! Flat JSON file backend.
//!
//! The file holds a single array of todo objects, pretty-printed with
//! 4-space indentation. Non-ASCII text is written as-is (UTF-8).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use super::traits::TodoBackend;
use crate::error::StoreError;
use crate::todos::model::Todo;

/// Backend that rewrites one JSON file on every persist.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used to stage writes before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.as_os_str().to_owned();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

/// Render `todos` the way the file is stored on disk.
pub fn encode_todos(todos: &[Todo]) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    todos.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

#[async_trait]
impl TodoBackend for JsonFileBackend {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn load(&self) -> Result<Vec<Todo>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Todo file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<Vec<Todo>>(&bytes) {
            Ok(todos) => Ok(todos),
            Err(e) => {
                // Corrupt content is discarded; the next persist overwrites it.
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Todo file is not a valid todo array, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let bytes = encode_todos(todos)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let staged = self.staging_path();
        fs::write(&staged, &bytes).await?;
        if let Err(e) = fs::rename(&staged, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&staged).await {
                warn!(path = %staged.display(), error = %cleanup, "Failed to remove staged todo file");
            }
            return Err(e.into());
        }

        debug!(path = %self.path.display(), count = todos.len(), "Todos persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn todo(id: i64, title: &str, dept: Option<&str>) -> Todo {
        Todo {
            id,
            title: title.into(),
            description: format!("about {title}"),
            is_completed: id % 2 == 0,
            department: dept.map(String::from),
        }
    }

    fn backend_in(dir: &TempDir) -> JsonFileBackend {
        JsonFileBackend::new(dir.path().join("todos.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persist_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let todos = vec![
            todo(1, "alpha", Some("General")),
            todo(2, "beta", Some("Sales")),
            todo(3, "gamma", None),
        ];
        backend.persist(&todos).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, todos);
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        fs::write(backend.path(), b"{ not json").await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        fs::write(backend.path(), br#"{"todos": []}"#).await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        fs::write(backend.path(), b"\n").await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn directory_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(matches!(backend.load().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn file_uses_four_space_indent_and_raw_utf8() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        backend
            .persist(&[todo(1, "café ☕", Some("Größe"))])
            .await
            .unwrap();

        let text = fs::read_to_string(backend.path()).await.unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\": 1,"));
        assert!(text.contains("café ☕"));
        assert!(text.contains("Größe"));
        assert!(!text.contains("\\u"));
        assert!(text.ends_with("]\n"));
    }

    #[tokio::test]
    async fn persist_creates_parent_dirs_and_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/data/todos.json"));
        backend.persist(&[todo(1, "a", None)]).await.unwrap();

        assert!(backend.path().exists());
        assert!(!backend.staging_path().exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_staging_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("todos.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let backend = JsonFileBackend::new(&target);
        let result = backend.persist(&[todo(1, "a", None)]).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!backend.staging_path().exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn empty_collection_encodes_as_empty_array() {
        let bytes = encode_todos(&[]).unwrap();
        assert_eq!(bytes, b"[]\n");
    }
}
