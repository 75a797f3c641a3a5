//! Task records and the request bodies that mutate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task as owned by the backend.
///
/// The backend is document-oriented and names the key `_id`; a plain `id`
/// is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// True when the task has a due date strictly before `now`
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }

    /// Past due and still open; this is what gets highlighted
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.is_past_due(now)
    }
}

/// Request body for `POST /api/todos`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /api/todos/:id`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(due: Option<DateTime<Utc>>, completed: bool) -> Task {
        Task {
            id: "t1".to_string(),
            title: "Write report".to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
            due_date: due,
        }
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "_id": "65f0c2",
            "title": "Buy milk",
            "completed": false,
            "createdAt": "2026-03-01T10:00:00.000Z",
            "dueDate": null,
            "user": "ignored"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "65f0c2");
        assert_eq!(task.title, "Buy milk");
        assert!(task.due_date.is_none());

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["_id"], "65f0c2");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_plain_id_alias() {
        let json = r#"{"id":"42","title":"x","createdAt":"2026-03-01T10:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "42");
        assert!(!task.completed);
    }

    #[test]
    fn test_past_due() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

        assert!(!sample(None, false).is_past_due(now));
        assert!(sample(Some(now - Duration::hours(1)), false).is_past_due(now));
        assert!(!sample(Some(now + Duration::hours(1)), false).is_past_due(now));
        assert!(!sample(Some(now), false).is_past_due(now));

        assert!(sample(Some(now - Duration::hours(1)), false).is_overdue(now));
        assert!(!sample(Some(now - Duration::hours(1)), true).is_overdue(now));
    }

    #[test]
    fn test_create_request_serializes_null_due_date() {
        let req = CreateTaskRequest {
            title: "Call mom".to_string(),
            due_date: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["title"], "Call mom");
        assert!(value["dueDate"].is_null());
    }
}
