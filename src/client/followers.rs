use taskboard_common::{FollowRequest, FollowerQuery, Page, SavedFollower, TaskFollower};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::ApiRequest;

impl ApiClient {
    pub async fn list_task_followers(
        &self,
        query: &FollowerQuery,
    ) -> Result<Page<TaskFollower>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/followers/").with_query(query)?)
            .await
    }

    pub async fn follow_task(&self, task_id: i64) -> Result<SavedFollower, ApiError> {
        self.fetch(
            ApiRequest::post("/tasks/followers/").with_json(&FollowRequest { task: task_id })?,
        )
        .await
    }

    /// Stop following; takes the follower record id, not the task id.
    pub async fn unfollow_task(&self, follower_id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!(
            "/tasks/followers/{}/",
            follower_id
        )))
        .await
    }

    /// Follow records of the signed-in user, each with its task.
    pub async fn my_followed_tasks(&self) -> Result<Vec<TaskFollower>, ApiError> {
        self.fetch(ApiRequest::get("/tasks/followers/my_followed_tasks/"))
            .await
    }
}
