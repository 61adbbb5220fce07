use taskboard_common::{NewTask, Page, SavedTask, Task, TaskQuery, TaskUpdate};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::ApiRequest;

fn task_path(id: i64) -> String {
    format!("/tasks/{}/", id)
}

impl ApiClient {
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/").with_query(query)?)
            .await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ApiError> {
        self.fetch(ApiRequest::get(task_path(id))).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<SavedTask, ApiError> {
        self.fetch(ApiRequest::post("/tasks/").with_json(task)?)
            .await
    }

    pub async fn update_task(
        &self,
        id: i64,
        update: &TaskUpdate,
    ) -> Result<SavedTask, ApiError> {
        self.fetch(ApiRequest::put(task_path(id)).with_json(update)?)
            .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(task_path(id))).await
    }

    /// Tasks assigned to the signed-in user.
    pub async fn my_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/my_tasks/")).await
    }

    /// Tasks the signed-in user created.
    pub async fn created_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/created_tasks/")).await
    }

    /// Open tasks past their due date.
    pub async fn overdue_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/overdue_tasks/")).await
    }

    pub async fn pinned_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/pinned_tasks/")).await
    }

    pub async fn pin_task(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::post(format!("/tasks/{}/pin_task/", id)))
            .await
    }

    pub async fn unpin_task(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::post(format!("/tasks/{}/unpin_task/", id)))
            .await
    }
}
