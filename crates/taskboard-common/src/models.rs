use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// "First Last" when the server has a name on file, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub manager: Option<User>,
    #[serde(default)]
    pub members: Vec<User>,
    #[serde(default)]
    pub member_count: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project: Option<Project>,
    pub assignee: Option<User>,
    #[serde(default)]
    pub created_by: Option<User>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub followers_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Open and past its due date, measured against `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < now)
    }
}

/// A task the server sends either as a bare primary key or as a nested record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskRef {
    Id(i64),
    Detail(Box<Task>),
}

impl TaskRef {
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Detail(task) => task.id,
        }
    }

    pub fn detail(&self) -> Option<&Task> {
        match self {
            Self::Id(_) => None,
            Self::Detail(task) => Some(task),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author: Option<User>,
    pub task: TaskRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskCreated,
    TaskUpdated,
    TaskAssigned,
    CommentAdded,
    TaskFollowed,
    TaskCompleted,
    #[serde(other)]
    Other,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskAssigned => "task_assigned",
            Self::CommentAdded => "comment_added",
            Self::TaskFollowed => "task_followed",
            Self::TaskCompleted => "task_completed",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_created" => Ok(Self::TaskCreated),
            "task_updated" => Ok(Self::TaskUpdated),
            "task_assigned" => Ok(Self::TaskAssigned),
            "comment_added" => Ok(Self::CommentAdded),
            "task_followed" => Ok(Self::TaskFollowed),
            "task_completed" => Ok(Self::TaskCompleted),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default, alias = "user")]
    pub recipient: Option<User>,
    #[serde(default)]
    pub notification_type: Option<NotificationType>,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "related_task")]
    pub task: Option<TaskRef>,
    #[serde(default)]
    pub related_project: Option<i64>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    StatusChanged,
    AssigneeChanged,
    DescriptionChanged,
    PriorityChanged,
    DueDateChanged,
    Pinned,
    Unpinned,
    #[serde(other)]
    Other,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChanged => "status_changed",
            Self::AssigneeChanged => "assignee_changed",
            Self::DescriptionChanged => "description_changed",
            Self::PriorityChanged => "priority_changed",
            Self::DueDateChanged => "due_date_changed",
            Self::Pinned => "pinned",
            Self::Unpinned => "unpinned",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status_changed" => Ok(Self::StatusChanged),
            "assignee_changed" => Ok(Self::AssigneeChanged),
            "description_changed" => Ok(Self::DescriptionChanged),
            "priority_changed" => Ok(Self::PriorityChanged),
            "due_date_changed" => Ok(Self::DueDateChanged),
            "pinned" => Ok(Self::Pinned),
            "unpinned" => Ok(Self::Unpinned),
            _ => Err(format!("Invalid log type: {}", s)),
        }
    }
}

/// One recorded change to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: i64,
    pub task: TaskRef,
    #[serde(default, alias = "changed_by")]
    pub user: Option<User>,
    #[serde(default, alias = "field_name")]
    pub log_type: Option<LogType>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(alias = "changed_at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFollower {
    pub id: i64,
    pub user: Option<User>,
    pub task: TaskRef,
    pub created_at: DateTime<Utc>,
}

/// A page of a paginated collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    #[serde(alias = "count")]
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_json() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "title": "Write release notes",
            "description": "",
            "project": null,
            "assignee": {"id": 2, "username": "mona"},
            "status": "in_progress",
            "priority": "urgent",
            "due_date": "2024-03-01T12:00:00Z",
            "is_pinned": true,
            "created_at": "2024-02-01T08:00:00+03:00",
            "updated_at": "2024-02-02T08:00:00Z"
        })
    }

    #[test]
    fn test_task_status_roundtrip() {
        for s in &["todo", "in_progress", "done"] {
            let parsed: TaskStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_roundtrip() {
        for s in &["low", "medium", "high", "urgent"] {
            let parsed: Priority = s.parse().unwrap();
            assert_eq!(parsed.to_string(), *s);
        }
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn test_log_type_parse_rejects_unknown() {
        assert_eq!("pinned".parse::<LogType>().unwrap(), LogType::Pinned);
        assert!("renamed".parse::<LogType>().is_err());
    }

    #[test]
    fn test_task_decodes_server_record() {
        let task: Task = serde_json::from_value(task_json()).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.assignee.unwrap().username, "mona");
        // +03:00 offset is normalized to UTC
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2024, 2, 1, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_task_is_overdue() {
        let task: Task = serde_json::from_value(task_json()).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        assert!(task.is_overdue(after));
        assert!(!task.is_overdue(before));

        let mut done = task.clone();
        done.status = TaskStatus::Done;
        assert!(!done.is_overdue(after));
    }

    #[test]
    fn test_task_ref_accepts_id_or_record() {
        let by_id: TaskRef = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(by_id.id(), 7);
        assert!(by_id.detail().is_none());

        let nested: TaskRef = serde_json::from_value(task_json()).unwrap();
        assert_eq!(nested.id(), 7);
        assert_eq!(nested.detail().unwrap().title, "Write release notes");
    }

    #[test]
    fn test_notification_accepts_client_field_names() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": 1,
            "user": {"id": 3, "username": "sam"},
            "title": "Assigned",
            "message": "You were assigned a task",
            "is_read": false,
            "related_task": 9,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.recipient.unwrap().username, "sam");
        assert_eq!(n.task.unwrap().id(), 9);
        assert!(n.notification_type.is_none());
    }

    #[test]
    fn test_notification_type_unknown_value_is_other() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": 1,
            "notification_type": "project_archived",
            "title": "Archived",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.notification_type, Some(NotificationType::Other));
    }

    #[test]
    fn test_unread_count_accepts_both_shapes() {
        let server: UnreadCount = serde_json::from_str(r#"{"unread_count": 4}"#).unwrap();
        let legacy: UnreadCount = serde_json::from_str(r#"{"count": 4}"#).unwrap();
        assert_eq!(server, legacy);
    }

    #[test]
    fn test_user_display_name_falls_back_to_username() {
        let mut user = User {
            id: 1,
            username: "lina".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            date_joined: None,
        };
        assert_eq!(user.display_name(), "lina");
        user.first_name = "Lina".into();
        user.last_name = "Haddad".into();
        assert_eq!(user.display_name(), "Lina Haddad");
    }

    #[test]
    fn test_page_decodes() {
        let page: Page<User> = serde_json::from_value(serde_json::json!({
            "count": 1,
            "next": "http://localhost:8000/api/users/?page=2",
            "previous": null,
            "results": [{"id": 1, "username": "a"}]
        }))
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.has_next());
    }
}
