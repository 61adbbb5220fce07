use taskboard_common::{AuthTokens, LoginCredentials, RegisterData, User};

use super::ApiClient;
use crate::errors::ApiError;
use crate::pipeline::{ApiRequest, TOKEN_PATH};

impl ApiClient {
    /// Exchange credentials for a token pair and start the session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthTokens, ApiError> {
        let tokens: AuthTokens = self
            .fetch(ApiRequest::post(TOKEN_PATH).with_json(credentials)?)
            .await?;
        self.pipeline.begin_session(&tokens)?;
        tracing::info!(username = %credentials.username, "signed in");
        Ok(tokens)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        self.fetch(ApiRequest::post("/users/").with_json(data)?)
            .await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(ApiRequest::get("/users/me/")).await
    }

    /// Forget the local session. The server keeps no session state to revoke.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.pipeline.end_session()
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.pipeline.is_authenticated()
    }
}
