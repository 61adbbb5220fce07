//! List filters for the collection endpoints, and their encoding as query pairs.

use serde::Serialize;
use serde::ser::Error as _;

use crate::models::{LogType, NotificationType, Priority, TaskStatus};

/// Flatten a filter struct into `(key, value)` pairs.
///
/// Unset (`None`) fields are skipped by the filter structs themselves; only
/// scalar values are accepted here.
pub fn query_pairs<T: Serialize>(filter: &T) -> Result<Vec<(String, String)>, serde_json::Error> {
    let value = serde_json::to_value(filter)?;
    let map = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Object(map) => map,
        other => {
            return Err(serde_json::Error::custom(format!(
                "query filter must be a struct, got {}",
                other
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde_json::Error::custom(format!(
                    "query field '{}' is not a scalar: {}",
                    key, other
                )));
            }
        };
        pairs.push((key, rendered));
    }
    Ok(pairs)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_type: Option<LogType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FollowerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_pairs() {
        assert!(query_pairs(&TaskQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_task_query_pairs() {
        let query = TaskQuery {
            status: Some(TaskStatus::InProgress),
            is_pinned: Some(true),
            project: Some(3),
            search: Some("release".into()),
            ..Default::default()
        };
        let mut pairs = query_pairs(&query).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("is_pinned".to_string(), "true".to_string()),
                ("project".to_string(), "3".to_string()),
                ("search".to_string(), "release".to_string()),
                ("status".to_string(), "in_progress".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_struct_filter_is_rejected() {
        assert!(query_pairs(&vec![1, 2]).is_err());
    }

    #[test]
    fn test_nested_value_is_rejected() {
        #[derive(Serialize)]
        struct Bad {
            ids: Vec<i64>,
        }
        let err = query_pairs(&Bad { ids: vec![1] }).unwrap_err();
        assert!(err.to_string().contains("ids"));
    }
}
