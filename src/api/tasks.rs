use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{ResourceKind, Task};
use crate::pagination::Page;

use super::{ApiClient, QueryParams};

/// The task endpoint returns a bare array on current servers and a page
/// envelope on some older ones.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskListing {
    Bare(Vec<Task>),
    Paged(Page<Task>),
}

impl TaskListing {
    fn into_first(self) -> Option<Task> {
        match self {
            Self::Bare(tasks) => tasks.into_iter().next(),
            Self::Paged(page) => page.results.into_iter().next(),
        }
    }
}

impl ApiClient {
    /// Looks a task up by the handle returned from an upload. A task that
    /// the server has not indexed yet is reported as not found.
    pub async fn get_task(&self, task_id: &str) -> ApiResult<Task> {
        let mut params = QueryParams::new();
        params.push("task_id", task_id);
        let listing: TaskListing = self
            .transport()
            .get(&params.apply(ResourceKind::Task.path()))
            .await?
            .expect_status(&[StatusCode::OK])?
            .json()?;
        listing
            .into_first()
            .ok_or_else(|| ApiError::not_found(ResourceKind::Task, task_id))
    }
}
