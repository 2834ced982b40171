//! In-memory task registry.
//!
//! Tracks the status and progress percentage of submitted jobs for the
//! status-polling boundary. The registry is a lock-guarded map keyed by
//! task ID with explicit create/update/get operations; shared across
//! concurrent jobs behind an `Arc`.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is actively being processed
    #[default]
    InProgress,
    /// Task completed successfully
    Completed,
    /// Task failed with an error
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Progress percentage (0-100)
    pub percentage: u8,
    pub status: TaskStatus,
    /// Error message if the task failed
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Concurrency-safe task registry.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new in-progress task and return its ID.
    pub async fn create(&self) -> TaskId {
        let id = TaskId::new();
        let now = Utc::now();
        let task = Task {
            id: id.clone(),
            percentage: 0,
            status: TaskStatus::InProgress,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(id.clone(), task);
        id
    }

    /// Snapshot of one task.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    /// Snapshot of all tasks.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    /// Update the progress percentage. Returns false for unknown IDs.
    pub async fn set_percentage(&self, id: &TaskId, percentage: u8) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(id) {
            Some(task) => {
                task.percentage = percentage.min(100);
                task.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Mark a task completed at 100%.
    pub async fn mark_completed(&self, id: &TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(id) {
            Some(task) => {
                task.percentage = 100;
                task.status = TaskStatus::Completed;
                task.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Mark a task failed, recording the error message.
    pub async fn mark_failed(&self, id: &TaskId, error: impl Into<String>) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(id) {
            Some(task) => {
                task.status = TaskStatus::Failed;
                task.error = Some(error.into());
                task.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Drop a task from the registry.
    pub async fn remove(&self, id: &TaskId) -> Option<Task> {
        self.tasks.write().await.remove(id)
    }
}
