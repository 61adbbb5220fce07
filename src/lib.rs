pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod navigation;
pub mod pipeline;
pub mod session;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigOverrides, ConfigToml};
pub use errors::{ApiError, ErrorBody, SessionError};
pub use navigation::{Navigator, RecordingNavigator, TerminalNavigator};
pub use pipeline::{ApiRequest, ApiResponse, Pipeline, ReqwestTransport, Transport};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
