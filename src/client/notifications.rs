use taskboard_common::{Notification, NotificationQuery, Page, TaskLog, TaskLogQuery, UnreadCount};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::ApiRequest;

impl ApiClient {
    pub async fn list_notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Page<Notification>, ApiError> {
        self.fetch(ApiRequest::get("/notifications/").with_query(query)?)
            .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::post(format!(
            "/notifications/{}/mark_as_read/",
            id
        )))
        .await
    }

    pub async fn mark_notification_unread(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::post(format!(
            "/notifications/{}/mark_as_unread/",
            id
        )))
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.send(ApiRequest::post("/notifications/mark_all_as_read/"))
            .await
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCount = self
            .fetch(ApiRequest::get("/notifications/unread_count/"))
            .await?;
        Ok(count.unread_count)
    }

    /// Change history of tasks visible to the signed-in user.
    pub async fn list_task_logs(&self, query: &TaskLogQuery) -> Result<Page<TaskLog>, ApiError> {
        self.fetch(ApiRequest::get("/notifications/logs/").with_query(query)?)
            .await
    }
}
