//! What the create/update endpoints send back.
//!
//! Writes echo the submitted fields rather than the full record: no `id`,
//! no timestamps, and related objects as bare ids. One type per resource
//! covers both the create and the update echo; fields only one of them
//! carries are optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Priority, TaskStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<i64>,
    /// Only in the update echo.
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Only in the create echo.
    #[serde(default)]
    pub project: Option<i64>,
    #[serde(default)]
    pub assignee: Option<i64>,
    /// Only in the update echo.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Only in the update echo.
    #[serde(default)]
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedComment {
    pub content: String,
    /// Only in the create echo.
    #[serde(default)]
    pub task: Option<i64>,
}

/// Echo of `POST /tasks/followers/`. The follower record id is not
/// included; list followers to find it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedFollower {
    pub task: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_create_echo_decodes() {
        let task: SavedTask = serde_json::from_value(json!({
            "title": "Write docs",
            "description": "",
            "project": 3,
            "assignee": null,
            "priority": "high",
            "due_date": null
        }))
        .unwrap();
        assert_eq!(task.project, Some(3));
        assert_eq!(task.assignee, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, None);
    }

    #[test]
    fn test_task_update_echo_decodes() {
        let task: SavedTask = serde_json::from_value(json!({
            "title": "Write docs",
            "description": "All of them",
            "assignee": 7,
            "status": "in_progress",
            "priority": "medium",
            "due_date": "2026-03-01T12:00:00Z",
            "is_pinned": true
        }))
        .unwrap();
        assert_eq!(task.project, None);
        assert_eq!(task.assignee, Some(7));
        assert_eq!(task.status, Some(TaskStatus::InProgress));
        assert_eq!(task.is_pinned, Some(true));
        assert!(task.due_date.is_some());
    }

    #[test]
    fn test_project_echo_has_member_ids() {
        let project: SavedProject = serde_json::from_value(json!({
            "title": "Website",
            "description": "Relaunch",
            "members": [2, 5]
        }))
        .unwrap();
        assert_eq!(project.members, vec![2, 5]);
        assert_eq!(project.is_active, None);
    }

    #[test]
    fn test_comment_and_follower_echoes_decode() {
        let comment: SavedComment =
            serde_json::from_value(json!({"content": "Looks good", "task": 4})).unwrap();
        assert_eq!(comment.task, Some(4));

        let edited: SavedComment = serde_json::from_value(json!({"content": "Edited"})).unwrap();
        assert_eq!(edited.task, None);

        let follower: SavedFollower = serde_json::from_value(json!({"task": 12})).unwrap();
        assert_eq!(follower.task, 12);
    }
}
