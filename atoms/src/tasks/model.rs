use crate::attrs::{self, Item};
use crate::ordering::Ordered;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Closed priority scale. Invalid values are rejected when the payload is
/// parsed, so nothing outside these four ever reaches the store.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
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
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(()),
        }
    }
}

/// A unit of work belonging to exactly one task list. `(task_list_id, order)`
/// determines its position in that list's display; `user_id` always matches
/// the owning list's user.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_list_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub completed: bool,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ordered for Task {
    fn order(&self) -> i64 {
        self.order
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub task_list_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

/// Partial update. `due_date` is tri-state: absent leaves the field alone,
/// an explicit JSON `null` clears it, a value sets it. The other optional
/// strings only distinguish absent from set.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "tri_state")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
}

impl UpdateTaskPayload {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
            && self.color.is_none()
            && self.completed.is_none()
            && self.order.is_none()
    }
}

/// Wraps a present value (including `null`) in `Some`, so the outer `Option`
/// keeps meaning "field absent from the payload".
fn tri_state<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskPayload {
    pub new_task_list_id: Option<String>,
    pub new_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksPayload {
    pub task_orders: Vec<TaskOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOrder {
    pub task_id: String,
    pub order: i64,
}

pub fn task_from_item(item: &Item) -> Option<Task> {
    let id = attrs::get_s(item, "PK")?.strip_prefix("TASK#")?.to_string();
    Some(Task {
        id,
        task_list_id: attrs::get_s(item, "task_list_id")?,
        user_id: attrs::get_s(item, "user_id")?,
        title: attrs::get_s(item, "title").unwrap_or_default(),
        description: attrs::get_s(item, "description"),
        due_date: attrs::get_time(item, "due_date"),
        priority: attrs::get_s(item, "priority")
            .and_then(|p| p.parse().ok())
            .unwrap_or_default(),
        notes: attrs::get_s(item, "notes"),
        color: attrs::get_s(item, "color"),
        completed: attrs::get_bool(item, "completed").unwrap_or(false),
        order: attrs::get_n(item, "order").unwrap_or_default(),
        created_at: attrs::get_time(item, "created_at")?,
        updated_at: attrs::get_time(item, "updated_at")?,
    })
}
