pub mod domain;
pub mod error;
pub mod forms;
pub mod schedule;
pub mod seed;
pub mod storage;

pub use domain::*;
pub use error::{Result, StorageError};
pub use storage::{SqliteStorage, Storage};
