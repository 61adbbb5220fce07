//! Authenticated request pipeline.
//!
//! Every API call goes through [`Pipeline::execute`]:
//!
//! ```text
//!   ApiRequest ──authorize──> RequestAttempt { retried: false }
//!        │                          │ send
//!        │                  ┌───────┴─────────┐
//!        │               non-401             401
//!        │                  │         ┌───────┴────────────────────┐
//!        │            2xx → Ok        retried, or the credential   any other first 401
//!        │            else → Status   exchange → Status(401)       │ mark_retried
//!        │                                                         │ POST /token/refresh/
//!        │                                          ┌──────────────┴───────────┐
//!        │                                       success                     failure
//!        │                                 store new access token     clear session, redirect
//!        │                                 with_bearer → send again   to login, Err(refresh error)
//! ```
//!
//! A request is refreshed at most once: the retried attempt never enters
//! the refresh branch again. Without a stored session the refresh step fails
//! with `SessionExpired`, which signs out like any other refresh failure.
//! A 401 from `POST /token/` is a rejected sign-in, not an expired session,
//! and is always returned as is.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskboard_common::{AuthTokens, RefreshRequest, RefreshedToken, query_pairs};
use tokio::sync::Mutex;

use crate::config::{ClientConfig, join_url};
use crate::errors::{ApiError, ErrorBody};
use crate::navigation::Navigator;
use crate::session::{Session, SessionStore};

pub const TOKEN_PATH: &str = "/token/";
pub const REFRESH_PATH: &str = "/token/refresh/";

/// A captured outbound call: everything needed to send it again.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Access token attached as `Authorization: Bearer ..`.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::InvalidRequest(format!("cannot encode body for {}: {}", self.path, e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_query<T: Serialize>(mut self, filter: &T) -> Result<Self, ApiError> {
        self.query = query_pairs(filter).map_err(|e| {
            ApiError::InvalidRequest(format!("cannot encode query for {}: {}", self.path, e))
        })?;
        Ok(self)
    }
}

/// One try at sending a request. `retried` is set once the request has
/// been through a refresh cycle.
#[derive(Debug, Clone)]
pub struct RequestAttempt {
    pub request: ApiRequest,
    pub retried: bool,
}

impl RequestAttempt {
    pub fn first(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn mark_retried(self) -> Self {
        Self {
            retried: true,
            ..self
        }
    }

    pub fn with_bearer(mut self, token: String) -> Self {
        self.request.bearer = Some(token);
        self
    }
}

/// What a refresh cycle produced for a rejected request.
#[derive(Debug)]
enum Refreshed {
    Token(String),
    /// The session was cleared while this request waited on the refresh
    /// gate. Whoever cleared it has already redirected.
    SignedOut,
}

/// Status and raw body of a response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the JSON body. An empty body decodes as `null`, so `()` and
    /// `Option<T>` work for 204 responses.
    pub fn decode<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub fn error_body(&self) -> ErrorBody {
        ErrorBody::from_bytes(&self.body)
    }
}

/// Sends a single request over the network, with no auth handling.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let transport_err = |source: reqwest::Error| ApiError::Transport {
            path: request.path.clone(),
            source,
        };
        let response = builder.send().await.map_err(transport_err)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_err)?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

/// Attaches credentials, recovers from an expired access token once per
/// request, and ends the session when recovery fails.
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    /// Present when concurrent refreshes are coalesced.
    refresh_gate: Option<Mutex<()>>,
}

impl Pipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            refresh_gate: None,
        }
    }

    /// Pipeline over HTTP for `config`.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::new(transport, store, navigator).with_refresh_coalescing(config.coalesce_refresh))
    }

    /// When enabled, requests that hit 401 together share one refresh call.
    pub fn with_refresh_coalescing(mut self, enabled: bool) -> Self {
        self.refresh_gate = enabled.then(|| Mutex::new(()));
        self
    }

    pub fn session(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.store.get()?)
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.store.get()?.is_some())
    }

    /// Store the token pair from a successful login.
    pub fn begin_session(&self, tokens: &AuthTokens) -> Result<(), ApiError> {
        self.store.set(&Session::new(&tokens.access, &tokens.refresh))?;
        tracing::info!("session started");
        Ok(())
    }

    /// Drop the session on an explicit logout. No redirect.
    pub fn end_session(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        tracing::info!("session ended");
        Ok(())
    }

    /// Send `request`, returning the successful response or the error the
    /// caller should see.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = RequestAttempt::first(self.authorize(request)?);

        loop {
            let response = self.dispatch(&attempt).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return finish(&attempt.request, response);
            }

            if attempt.retried || attempt.request.path == TOKEN_PATH {
                tracing::debug!(
                    method = %attempt.request.method,
                    path = %attempt.request.path,
                    retried = attempt.retried,
                    "passing 401 through"
                );
                return finish(&attempt.request, response);
            }

            let rejected = attempt.request.bearer.clone();
            attempt = attempt.mark_retried();
            match self.refresh(rejected.as_deref()).await {
                Ok(Refreshed::Token(access)) => attempt = attempt.with_bearer(access),
                Ok(Refreshed::SignedOut) => {
                    tracing::debug!(
                        path = %attempt.request.path,
                        "session ended while waiting for refresh"
                    );
                    return Err(ApiError::SessionExpired);
                }
                Err(err) => {
                    self.force_logout(&err);
                    return Err(err);
                }
            }
        }
    }

    fn authorize(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        request.bearer = self.store.get()?.map(|session| session.access_token);
        Ok(request)
    }

    async fn dispatch(&self, attempt: &RequestAttempt) -> Result<ApiResponse, ApiError> {
        tracing::debug!(
            method = %attempt.request.method,
            path = %attempt.request.path,
            authenticated = attempt.request.bearer.is_some(),
            retried = attempt.retried,
            "dispatching request"
        );
        let response = self.transport.send(&attempt.request).await?;
        tracing::debug!(
            path = %attempt.request.path,
            status = response.status.as_u16(),
            "response received"
        );
        Ok(response)
    }

    /// Obtain a fresh access token. `rejected` is the token the server just
    /// turned down.
    async fn refresh(&self, rejected: Option<&str>) -> Result<Refreshed, ApiError> {
        let Some(gate) = &self.refresh_gate else {
            return self.refresh_now().await.map(Refreshed::Token);
        };

        let _guard = gate.lock().await;
        // Another request may have refreshed, or signed out, while this one
        // waited.
        match self.store.get()? {
            Some(session) if Some(session.access_token.as_str()) != rejected => {
                tracing::debug!("reusing access token refreshed by a concurrent request");
                Ok(Refreshed::Token(session.access_token))
            }
            None if rejected.is_some() => Ok(Refreshed::SignedOut),
            _ => self.refresh_now().await.map(Refreshed::Token),
        }
    }

    async fn refresh_now(&self) -> Result<String, ApiError> {
        let session = self.store.get()?.ok_or(ApiError::SessionExpired)?;

        let request = ApiRequest::post(REFRESH_PATH).with_json(&RefreshRequest {
            refresh: session.refresh_token.clone(),
        })?;
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(ApiError::RefreshFailed {
                status: response.status,
                body: response.error_body(),
            });
        }

        let token: RefreshedToken = response.decode(REFRESH_PATH)?;
        let rotated = token.refresh.is_some();
        self.store
            .set(&session.refreshed(token.access.clone(), token.refresh))?;
        tracing::info!(rotated, "access token refreshed");
        Ok(token.access)
    }

    fn force_logout(&self, reason: &ApiError) {
        tracing::warn!(error = %reason, "session could not be refreshed, signing out");
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear session");
        }
        self.navigator.redirect_to_login();
    }
}

fn finish(request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            method: request.method.clone(),
            path: request.path.clone(),
            status: response.status,
            body: response.error_body(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;
    use crate::session::MemorySessionStore;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex as StdMutex;

    /// Replies from a fixed script and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: StdMutex<VecDeque<(StatusCode, serde_json::Value)>>,
        sent: StdMutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<(StatusCode, serde_json::Value)>) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.into()),
                sent: StdMutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().clone()
        }

        fn refresh_calls(&self) -> usize {
            self.sent()
                .iter()
                .filter(|r| r.path == REFRESH_PATH)
                .count()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.sent.lock().unwrap().push(request.clone());
            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport script exhausted");
            let bytes = if body.is_null() {
                Vec::new()
            } else {
                serde_json::to_vec(&body).unwrap()
            };
            Ok(ApiResponse::new(status, bytes))
        }
    }

    /// Accepts any access token it has issued; refresh issues a new one.
    struct TokenServer {
        valid: StdMutex<HashSet<String>>,
        refresh_token: String,
        issued: StdMutex<u32>,
        refresh_calls: StdMutex<u32>,
    }

    impl TokenServer {
        fn new(refresh_token: &str) -> Arc<Self> {
            Arc::new(Self {
                valid: StdMutex::new(HashSet::new()),
                refresh_token: refresh_token.to_string(),
                issued: StdMutex::new(1),
                refresh_calls: StdMutex::new(0),
            })
        }

        fn refresh_calls(&self) -> u32 {
            *self.refresh_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for TokenServer {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            tokio::task::yield_now().await;
            if request.path == REFRESH_PATH {
                *self.refresh_calls.lock().unwrap() += 1;
                let presented = request.body.as_ref().and_then(|b| b["refresh"].as_str());
                if presented != Some(self.refresh_token.as_str()) {
                    return Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, b"{}".to_vec()));
                }
                let access = {
                    let mut issued = self.issued.lock().unwrap();
                    *issued += 1;
                    format!("A{}", *issued)
                };
                self.valid.lock().unwrap().insert(access.clone());
                tokio::task::yield_now().await;
                let body = serde_json::json!({ "access": access });
                return Ok(ApiResponse::new(StatusCode::OK, body.to_string()));
            }

            let authorized = request
                .bearer
                .as_ref()
                .is_some_and(|t| self.valid.lock().unwrap().contains(t));
            if authorized {
                Ok(ApiResponse::new(StatusCode::OK, b"[]".to_vec()))
            } else {
                Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, b"{}".to_vec()))
            }
        }
    }

    fn pipeline(
        transport: Arc<dyn Transport>,
        session: Option<Session>,
    ) -> (Pipeline, Arc<MemorySessionStore>, Arc<RecordingNavigator>) {
        let store = Arc::new(match session {
            Some(s) => MemorySessionStore::with_session(s),
            None => MemorySessionStore::new(),
        });
        let nav = Arc::new(RecordingNavigator::new());
        let pipeline = Pipeline::new(transport, store.clone(), nav.clone());
        (pipeline, store, nav)
    }

    fn unauthorized() -> (StatusCode, serde_json::Value) {
        (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"detail": "Given token not valid", "code": "token_not_valid"}),
        )
    }

    #[tokio::test]
    async fn test_attaches_current_access_token() {
        let transport = ScriptedTransport::new(vec![(StatusCode::OK, serde_json::json!([]))]);
        let (pipeline, _, _) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        pipeline.execute(ApiRequest::get("/projects/")).await.unwrap();

        assert_eq!(transport.sent()[0].bearer.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_no_session_dispatches_unauthenticated() {
        let transport = ScriptedTransport::new(vec![(StatusCode::OK, serde_json::json!({}))]);
        let (pipeline, _, _) = pipeline(transport.clone(), None);

        pipeline.execute(ApiRequest::get("/projects/")).await.unwrap();

        assert!(transport.sent()[0].bearer.is_none());
    }

    #[tokio::test]
    async fn test_refresh_and_retry_returns_retry_result() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            (StatusCode::OK, serde_json::json!({"access": "A2"})),
            (StatusCode::OK, serde_json::json!([{"id": 1}])),
        ]);
        let (pipeline, store, nav) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        let response = pipeline.execute(ApiRequest::get("/tasks/")).await.unwrap();
        let tasks: serde_json::Value = response.decode("/tasks/").unwrap();
        assert_eq!(tasks, serde_json::json!([{"id": 1}]));

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].path, REFRESH_PATH);
        assert_eq!(sent[1].body, Some(serde_json::json!({"refresh": "R1"})));
        assert!(sent[1].bearer.is_none());
        assert_eq!(sent[2].path, "/tasks/");
        assert_eq!(sent[2].bearer.as_deref(), Some("A2"));

        assert_eq!(store.get().unwrap(), Some(Session::new("A2", "R1")));
        assert_eq!(nav.redirects(), 0);
    }

    #[tokio::test]
    async fn test_retry_replays_method_and_body() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            (StatusCode::OK, serde_json::json!({"access": "A2"})),
            (StatusCode::CREATED, serde_json::json!({"id": 3})),
        ]);
        let (pipeline, _, _) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        let request = ApiRequest::post("/comments/")
            .with_json(&serde_json::json!({"task": 9, "content": "hi"}))
            .unwrap();
        pipeline.execute(request).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].body, sent[2].body);
        assert_eq!(sent[2].method, Method::POST);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_session_and_redirects() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({"detail": "Token is invalid or expired"}),
            ),
        ]);
        let (pipeline, store, nav) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        let err = pipeline
            .execute(ApiRequest::delete("/tasks/5/"))
            .await
            .unwrap_err();

        match &err {
            ApiError::RefreshFailed { status, body } => {
                assert_eq!(*status, StatusCode::UNAUTHORIZED);
                assert_eq!(body.detail(), "Token is invalid or expired");
            }
            other => panic!("Expected RefreshFailed, got {:?}", other),
        }
        assert!(store.get().unwrap().is_none());
        assert_eq!(nav.redirects(), 1);
        // the original request is not replayed
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_second_401_is_not_refreshed_again() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            (StatusCode::OK, serde_json::json!({"access": "A2"})),
            unauthorized(),
        ]);
        let (pipeline, store, nav) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        let err = pipeline
            .execute(ApiRequest::get("/tasks/"))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(transport.sent().len(), 3);
        // refresh itself succeeded, so the session stays
        assert_eq!(store.get().unwrap(), Some(Session::new("A2", "R1")));
        assert_eq!(nav.redirects(), 0);
    }

    #[tokio::test]
    async fn test_non_401_errors_pass_through() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let transport =
                ScriptedTransport::new(vec![(status, serde_json::json!({"detail": "nope"}))]);
            let (pipeline, store, nav) =
                pipeline(transport.clone(), Some(Session::new("A1", "R1")));

            let err = pipeline
                .execute(ApiRequest::get("/projects/1/"))
                .await
                .unwrap_err();

            assert_eq!(err.status(), Some(status));
            assert_eq!(err.detail(), "nope");
            assert_eq!(transport.sent().len(), 1);
            assert!(store.get().unwrap().is_some());
            assert_eq!(nav.redirects(), 0);
        }
    }

    #[tokio::test]
    async fn test_rejected_sign_in_is_not_recovered() {
        let transport = ScriptedTransport::new(vec![(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"detail": "No active account found with the given credentials"}),
        )]);
        // A stale session must not turn a bad password into a refresh cycle.
        let (pipeline, store, nav) =
            pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        let err = pipeline
            .execute(ApiRequest::post(TOKEN_PATH))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!err.ended_session());
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(nav.redirects(), 0);
        assert!(store.get().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_401_without_session_signs_out() {
        let transport = ScriptedTransport::new(vec![unauthorized()]);
        let (pipeline, store, nav) = pipeline(transport.clone(), None);

        let err = pipeline
            .execute(ApiRequest::get("/users/me/"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(nav.redirects(), 1);
        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_cleared_mid_flight_expires() {
        let transport = ScriptedTransport::new(vec![]);
        let (pipeline, store, nav) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));

        // Another request signed the user out before this one could refresh.
        store.clear().unwrap();
        let err = pipeline.refresh(Some("A1")).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(transport.refresh_calls(), 0);

        pipeline.force_logout(&err);
        assert_eq!(nav.redirects(), 1);
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            (
                StatusCode::OK,
                serde_json::json!({"access": "A2", "refresh": "R2"}),
            ),
            (StatusCode::NO_CONTENT, serde_json::Value::Null),
        ]);
        let (pipeline, store, _) = pipeline(transport, Some(Session::new("A1", "R1")));

        let response = pipeline
            .execute(ApiRequest::post("/tasks/4/pin_task/"))
            .await
            .unwrap();
        response.decode::<()>("/tasks/4/pin_task/").unwrap();

        assert_eq!(store.get().unwrap(), Some(Session::new("A2", "R2")));
    }

    #[tokio::test]
    async fn test_concurrent_401s_each_refresh_by_default() {
        let server = TokenServer::new("R1");
        let (pipeline, _, _) = pipeline(server.clone(), Some(Session::new("A1", "R1")));

        let (a, b) = tokio::join!(
            pipeline.execute(ApiRequest::get("/tasks/")),
            pipeline.execute(ApiRequest::get("/projects/")),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(server.refresh_calls(), 2);
    }

    #[tokio::test]
    async fn test_coalesced_refresh_runs_once() {
        let server = TokenServer::new("R1");
        let (pipeline, store, _) = pipeline(server.clone(), Some(Session::new("A1", "R1")));
        let pipeline = pipeline.with_refresh_coalescing(true);

        let (a, b, c) = tokio::join!(
            pipeline.execute(ApiRequest::get("/tasks/")),
            pipeline.execute(ApiRequest::get("/projects/")),
            pipeline.execute(ApiRequest::get("/comments/")),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(store.get().unwrap(), Some(Session::new("A2", "R1")));
    }

    #[tokio::test]
    async fn test_coalesced_refresh_failure_signs_out_once() {
        let server = TokenServer::new("R1");
        let (pipeline, store, nav) =
            pipeline(server.clone(), Some(Session::new("A1", "revoked")));
        let pipeline = pipeline.with_refresh_coalescing(true);

        let (a, b, c) = tokio::join!(
            pipeline.execute(ApiRequest::get("/tasks/")),
            pipeline.execute(ApiRequest::get("/projects/")),
            pipeline.execute(ApiRequest::get("/comments/")),
        );

        let errors = [a.unwrap_err(), b.unwrap_err(), c.unwrap_err()];
        assert!(errors.iter().all(ApiError::ended_session), "{errors:?}");
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ApiError::RefreshFailed { .. }))
                .count(),
            1
        );
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(nav.redirects(), 1);
        assert!(store.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_waiter_finding_no_session_does_not_redirect() {
        let transport = ScriptedTransport::new(vec![]);
        let (pipeline, store, nav) = pipeline(transport.clone(), Some(Session::new("A1", "R1")));
        let pipeline = pipeline.with_refresh_coalescing(true);

        store.clear().unwrap();
        let outcome = pipeline.refresh(Some("A1")).await.unwrap();
        assert!(matches!(outcome, Refreshed::SignedOut));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(nav.redirects(), 0);
    }

    #[tokio::test]
    async fn test_begin_and_end_session() {
        let transport = ScriptedTransport::new(vec![]);
        let (pipeline, store, nav) = pipeline(transport, None);
        assert!(!pipeline.is_authenticated().unwrap());

        pipeline
            .begin_session(&AuthTokens {
                access: "A1".into(),
                refresh: "R1".into(),
            })
            .unwrap();
        assert_eq!(store.get().unwrap(), Some(Session::new("A1", "R1")));

        pipeline.end_session().unwrap();
        assert!(!pipeline.is_authenticated().unwrap());
        assert_eq!(nav.redirects(), 0);
    }

    #[test]
    fn test_request_attempt_transitions() {
        let attempt = RequestAttempt::first(ApiRequest::get("/tasks/"));
        assert!(!attempt.retried);
        let attempt = attempt.mark_retried().with_bearer("A2".into());
        assert!(attempt.retried);
        assert_eq!(attempt.request.bearer.as_deref(), Some("A2"));
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        let response = ApiResponse::new(StatusCode::NO_CONTENT, Vec::new());
        response.decode::<()>("/tasks/1/").unwrap();
        let missing: Option<serde_json::Value> = response.decode("/tasks/1/").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_decode_error_names_path() {
        let response = ApiResponse::new(StatusCode::OK, b"not json".to_vec());
        let err = response.decode::<serde_json::Value>("/tasks/").unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "/tasks/"));
    }

    #[test]
    fn test_with_query_encodes_filter() {
        let request = ApiRequest::get("/tasks/")
            .with_query(&taskboard_common::TaskQuery {
                project: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(request.query, vec![("project".to_string(), "2".to_string())]);
    }
}
