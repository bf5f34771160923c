// tasks/store.rs — TaskStore trait + SQLite and in-memory backends.
//
// The store is the single-table key-value boundary: scan, get, put,
// conditional partial update, conditional delete — each keyed by task id.
// Update and delete are single conditional writes, so existence check and
// mutation are one atomic store call; a concurrent delete cannot interleave
// between them. The loser simply observes the not-found outcome.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::Task;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Partial update applied by `TaskStore::update`. `Some` = write the field,
/// `None` = leave it untouched. Values are already trimmed by the service.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

/// Storage boundary for task records, keyed by `id`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every record, in no particular order.
    async fn scan(&self) -> Result<Vec<Task>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Insert a full record.
    async fn put(&self, task: &Task) -> Result<(), StoreError>;

    /// Conditional partial update: applies the patch's present fields plus
    /// `updated_at` in one write, returning the merged record, or `None`
    /// when no record has that id.
    async fn update(
        &self,
        id: &str,
        patch: &TaskPatch,
        updated_at: &str,
    ) -> Result<Option<Task>, StoreError>;

    /// Conditional delete: `false` when no record had that id.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

// ─── SQLite backend ───────────────────────────────────────────────────────────

pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (or create) `{data_dir}/taskd.db` and run migrations.
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the tasks table (idempotent).
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT,
                due_date    TEXT,
                completed   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at DESC);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

const TASK_COLUMNS: &str = "id, title, description, due_date, completed, created_at, updated_at";

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn scan(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks"))
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(task)
    }

    async fn put(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, due_date, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.due_date)
        .bind(task.completed)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        patch: &TaskPatch,
        updated_at: &str,
    ) -> Result<Option<Task>, StoreError> {
        // SET clause assembled from the patch's present fields; binds below
        // must follow the same order.
        let mut sql = String::from("UPDATE tasks SET updated_at = ?");
        if patch.title.is_some() {
            sql.push_str(", title = ?");
        }
        if patch.description.is_some() {
            sql.push_str(", description = ?");
        }
        if patch.due_date.is_some() {
            sql.push_str(", due_date = ?");
        }
        if patch.completed.is_some() {
            sql.push_str(", completed = ?");
        }
        sql.push_str(&format!(" WHERE id = ? RETURNING {TASK_COLUMNS}"));

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(updated_at);
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(description) = &patch.description {
            query = query.bind(description);
        }
        if let Some(due_date) = &patch.due_date {
            query = query.bind(due_date);
        }
        if let Some(completed) = patch.completed {
            query = query.bind(completed);
        }

        let task = query.bind(id).fetch_optional(&self.pool).await?;
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ─── In-memory backend ────────────────────────────────────────────────────────

/// Ephemeral backend: same contract as SQLite, each operation atomic under
/// the lock. Selected with `storage = "memory"` / `--in-memory`; also the
/// substitutable fake for service tests.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn scan(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn put(&self, task: &Task) -> Result<(), StoreError> {
        debug!(task_id = %task.id, "storing task in memory");
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        patch: &TaskPatch,
        updated_at: &str,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = &patch.due_date {
            task.due_date = Some(due_date.clone());
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = updated_at.to_string();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }
}
