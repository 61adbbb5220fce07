//! Typed API client.
//!
//! One method per server operation, grouped by resource:
//!
//! | Module          | Endpoints                                             |
//! |-----------------|-------------------------------------------------------|
//! | `auth`          | `/token/`, `/users/`, `/users/me/`                    |
//! | `projects`      | `/projects/…` incl. member actions                    |
//! | `tasks`         | `/tasks/…` incl. pin/unpin and the personal views     |
//! | `comments`      | `/comments/…`                                         |
//! | `notifications` | `/notifications/…` and `/notifications/logs/`         |
//! | `followers`     | `/tasks/followers/…`                                  |
//!
//! Methods only shape parameters; every call goes through [`Pipeline`],
//! which owns credentials and token refresh.

mod auth;
mod comments;
mod followers;
mod notifications;
mod projects;
mod tasks;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::navigation::Navigator;
use crate::pipeline::{ApiRequest, Pipeline};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(Pipeline::from_config(config, store, navigator)?))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Execute `request` and decode the response body.
    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.pipeline.execute(request).await?;
        response.decode(&path)
    }

    /// Execute `request`, ignoring whatever the server acknowledges with.
    async fn send(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.pipeline.execute(request).await?;
        Ok(())
    }
}
