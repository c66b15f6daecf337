use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use skills_types::models::{NewTask, Task, TaskChanges};

use crate::ports::TaskStore;
use crate::{CoreError, CoreResult};

pub const DEFAULT_TASK_PAGE: u32 = 20;

#[derive(Clone)]
pub struct Tasks {
    store: Arc<dyn TaskStore>,
}

impl Tasks {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        title: Option<String>,
        description: Option<String>,
        requirements: Vec<String>,
    ) -> CoreResult<Task> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::invalid("Title is required"))?;
        let task = self
            .store
            .insert_task(NewTask {
                title,
                description,
                requirements,
            })
            .await?;
        info!(task_id = %task.id, "task created");
        Ok(task)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Task not found"))
    }

    pub async fn update(&self, id: Uuid, changes: TaskChanges) -> CoreResult<Task> {
        if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CoreError::invalid("Title cannot be empty"));
        }
        self.store
            .update_task(id, changes)
            .await?
            .ok_or_else(|| CoreError::not_found("Task not found"))
    }

    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.store.delete_task(id).await? {
            return Err(CoreError::not_found("Task not found"));
        }
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    pub async fn list(&self, limit: Option<u32>, offset: Option<u32>) -> CoreResult<Vec<Task>> {
        self.store
            .list_tasks(limit.unwrap_or(DEFAULT_TASK_PAGE), offset.unwrap_or(0))
            .await
    }

    /// Requirements for matching.
    pub async fn requirements_of(&self, id: Uuid) -> CoreResult<Vec<String>> {
        Ok(self.get(id).await?.requirements)
    }
}
