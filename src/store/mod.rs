//! Persistence layer — backends that load and persist the whole todo collection.

pub mod json_file;
pub mod memory;
pub mod traits;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use traits::TodoBackend;
