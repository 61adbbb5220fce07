//! Shared records for the taskboard client.
//!
//! Everything here is plain data: the server's resource records, the
//! request bodies the client sends, the echoes write endpoints return, and
//! the filters for list endpoints.
//! No I/O lives in this crate.

pub mod auth;
pub mod models;
pub mod payloads;
pub mod query;
pub mod saved;

pub use auth::{AuthTokens, LoginCredentials, RefreshRequest, RefreshedToken, RegisterData};
pub use models::{
    Comment, LogType, Notification, NotificationType, Page, Priority, Project, Task, TaskFollower,
    TaskLog, TaskRef, TaskStatus, UnreadCount, User,
};
pub use payloads::{
    CommentUpdate, FollowRequest, MemberChange, NewComment, NewProject, NewTask, ProjectUpdate,
    TaskUpdate,
};
pub use query::{
    CommentQuery, FollowerQuery, NotificationQuery, ProjectQuery, TaskLogQuery, TaskQuery,
    query_pairs,
};
pub use saved::{SavedComment, SavedFollower, SavedProject, SavedTask};
