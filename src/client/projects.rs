use taskboard_common::{
    MemberChange, NewProject, Page, Project, ProjectQuery, ProjectUpdate, SavedProject,
};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::ApiRequest;

fn project_path(id: i64) -> String {
    format!("/projects/{}/", id)
}

impl ApiClient {
    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<Page<Project>, ApiError> {
        self.fetch(ApiRequest::get("/projects/").with_query(query)?)
            .await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ApiError> {
        self.fetch(ApiRequest::get(project_path(id))).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<SavedProject, ApiError> {
        self.fetch(ApiRequest::post("/projects/").with_json(project)?)
            .await
    }

    pub async fn update_project(
        &self,
        id: i64,
        update: &ProjectUpdate,
    ) -> Result<SavedProject, ApiError> {
        self.fetch(ApiRequest::put(project_path(id)).with_json(update)?)
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(project_path(id))).await
    }

    pub async fn add_project_member(&self, project_id: i64, user_id: i64) -> Result<(), ApiError> {
        let path = format!("/projects/{}/add_member/", project_id);
        self.send(ApiRequest::post(path).with_json(&MemberChange { user_id })?)
            .await
    }

    pub async fn remove_project_member(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<(), ApiError> {
        let path = format!("/projects/{}/remove_member/", project_id);
        self.send(ApiRequest::post(path).with_json(&MemberChange { user_id })?)
            .await
    }

    /// Projects the signed-in user manages.
    pub async fn my_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch(ApiRequest::get("/projects/my_projects/")).await
    }

    /// Projects the signed-in user belongs to without managing them.
    pub async fn member_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch(ApiRequest::get("/projects/member_projects/"))
            .await
    }
}
