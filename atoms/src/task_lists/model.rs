use crate::attrs::{self, Item};
use crate::ordering::Ordered;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered container of tasks owned by exactly one user.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Display position among the user's lists. Not necessarily contiguous.
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ordered for TaskList {
    fn order(&self) -> i64 {
        self.order
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskListPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskListPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

impl UpdateTaskListPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.order.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTaskListsPayload {
    pub task_list_orders: Vec<TaskListOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListOrder {
    pub task_list_id: String,
    pub order: i64,
}

pub fn task_list_from_item(item: &Item) -> Option<TaskList> {
    let id = attrs::get_s(item, "PK")?.strip_prefix("LIST#")?.to_string();
    Some(TaskList {
        id,
        user_id: attrs::get_s(item, "user_id")?,
        name: attrs::get_s(item, "name").unwrap_or_default(),
        description: attrs::get_s(item, "description"),
        color: attrs::get_s(item, "color"),
        order: attrs::get_n(item, "order").unwrap_or_default(),
        created_at: attrs::get_time(item, "created_at")?,
        updated_at: attrs::get_time(item, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;

    fn base_item() -> Item {
        let mut item = Item::new();
        item.insert("PK".into(), AttributeValue::S("LIST#l-1".into()));
        item.insert("SK".into(), AttributeValue::S("META".into()));
        item.insert("user_id".into(), AttributeValue::S("u-1".into()));
        item.insert("name".into(), AttributeValue::S("Groceries".into()));
        item.insert("order".into(), AttributeValue::N("2".into()));
        item.insert(
            "created_at".into(),
            AttributeValue::S("2026-02-01T10:00:00.000000Z".into()),
        );
        item.insert(
            "updated_at".into(),
            AttributeValue::S("2026-02-02T10:00:00.000000Z".into()),
        );
        item
    }

    #[test]
    fn task_list_from_item_extracts_the_id_from_the_key() {
        let list = task_list_from_item(&base_item()).unwrap();
        assert_eq!(list.id, "l-1");
        assert_eq!(list.user_id, "u-1");
        assert_eq!(list.name, "Groceries");
        assert_eq!(list.order, 2);
        assert_eq!(list.description, None);
    }

    #[test]
    fn task_list_from_item_rejects_foreign_keys() {
        let mut item = base_item();
        item.insert("PK".into(), AttributeValue::S("TASK#t-1".into()));
        assert!(task_list_from_item(&item).is_none());
    }

    #[test]
    fn update_payload_empty_detection() {
        let payload: UpdateTaskListPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
        let payload: UpdateTaskListPayload =
            serde_json::from_str(r#"{"order": 3}"#).unwrap();
        assert!(!payload.is_empty());
    }
}
