pub mod model;
pub mod service;
pub mod store;

pub use model::{CreateTaskInput, Task, UpdateTaskInput, ValidationError};
pub use service::{TaskError, TaskService};
pub use store::{MemoryTaskStore, SqliteTaskStore, StoreError, TaskPatch, TaskStore};
