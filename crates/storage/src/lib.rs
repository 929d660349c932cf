#![forbid(unsafe_code)]

pub mod repository;
pub mod resources;
pub mod sqlite;

pub use repository::{Storage, StorageError};
pub use resources::{ResourceError, ResourceLayout, ResourceStore};
