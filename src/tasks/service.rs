// tasks/service.rs — Task CRUD service.
//
// Stamps ids and timestamps, trims string fields, orders listings, and
// converts store failures into generic per-operation errors. Not-found is
// a normal outcome (`Ok(None)` / `Ok(false)`), never an error. Inputs are
// already parsed/validated by the HTTP layer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::model::{CreateTaskInput, Task, UpdateTaskInput};
use super::store::{TaskPatch, TaskStore};

/// Storage failures surfaced to clients. The message names the attempted
/// operation; driver-level detail stays in the log.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    #[error("Failed to fetch tasks")]
    ListFailed,
    #[error("Failed to fetch task")]
    FetchFailed,
    #[error("Failed to create task")]
    CreateFailed,
    #[error("Failed to update task")]
    UpdateFailed,
    #[error("Failed to delete task")]
    DeleteFailed,
}

/// Task CRUD orchestration over an injected storage backend.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// All tasks, newest-created first. Unbounded.
    pub async fn list(&self) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.store.scan().await.map_err(|e| {
            error!(operation = "list", err = %e, "task store scan failed");
            TaskError::ListFailed
        })?;
        // RFC 3339 at a fixed UTC offset sorts chronologically as a string.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// `Ok(None)` when no task has that id.
    pub async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
        let task = self.store.get(id).await.map_err(|e| {
            error!(operation = "get", task_id = %id, err = %e, "task store get failed");
            TaskError::FetchFailed
        })?;
        if task.is_none() {
            debug!(task_id = %id, "task not found");
        }
        Ok(task)
    }

    /// Create a task from parsed input. Not idempotent: identical inputs
    /// produce distinct tasks.
    pub async fn create(&self, input: CreateTaskInput) -> Result<Task, TaskError> {
        let now = Utc::now().to_rfc3339();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.map(|d| d.trim().to_string()),
            due_date: input.due_date,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.put(&task).await.map_err(|e| {
            error!(operation = "create", task_id = %task.id, err = %e, "task store put failed");
            TaskError::CreateFailed
        })?;

        info!(task_id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    /// Apply a parsed partial update as one conditional write; `updatedAt`
    /// is refreshed regardless of which fields changed. `Ok(None)` when no
    /// task has that id.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateTaskInput,
    ) -> Result<Option<Task>, TaskError> {
        let patch = TaskPatch {
            title: input.title.map(|t| t.trim().to_string()),
            description: input.description.map(|d| d.trim().to_string()),
            due_date: input.due_date,
            completed: input.completed,
        };
        let now = Utc::now().to_rfc3339();

        let task = self.store.update(id, &patch, &now).await.map_err(|e| {
            error!(operation = "update", task_id = %id, err = %e, "task store update failed");
            TaskError::UpdateFailed
        })?;

        match &task {
            Some(_) => info!(task_id = %id, "task updated"),
            None => debug!(task_id = %id, "task not found for update"),
        }
        Ok(task)
    }

    /// One conditional delete. `Ok(false)` when no task had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, TaskError> {
        let deleted = self.store.delete(id).await.map_err(|e| {
            error!(operation = "delete", task_id = %id, err = %e, "task store delete failed");
            TaskError::DeleteFailed
        })?;

        if deleted {
            info!(task_id = %id, "task deleted");
        } else {
            debug!(task_id = %id, "task not found for delete");
        }
        Ok(deleted)
    }
}
