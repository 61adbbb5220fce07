use taskboard_common::{Comment, CommentQuery, CommentUpdate, NewComment, Page, SavedComment};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::ApiRequest;

fn comment_path(id: i64) -> String {
    format!("/comments/{}/", id)
}

impl ApiClient {
    pub async fn list_comments(&self, query: &CommentQuery) -> Result<Page<Comment>, ApiError> {
        self.fetch(ApiRequest::get("/comments/").with_query(query)?)
            .await
    }

    pub async fn create_comment(&self, comment: &NewComment) -> Result<SavedComment, ApiError> {
        self.fetch(ApiRequest::post("/comments/").with_json(comment)?)
            .await
    }

    pub async fn update_comment(
        &self,
        id: i64,
        update: &CommentUpdate,
    ) -> Result<SavedComment, ApiError> {
        self.fetch(ApiRequest::put(comment_path(id)).with_json(update)?)
            .await
    }

    pub async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(comment_path(id))).await
    }
}
