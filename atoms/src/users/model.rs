use crate::attrs::{self, Item};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record, provisioned on first successful sign-in and never deleted
/// here. The Google subject is the external identity key; `id` is the stable
/// internal identifier every list and task is scoped to.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub google_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl UpdateUserPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.picture.is_none()
    }
}

pub fn user_from_item(item: &Item) -> Option<User> {
    Some(User {
        id: attrs::get_s(item, "user_id")?,
        google_id: attrs::get_s(item, "google_id")?,
        email: attrs::get_s(item, "email").unwrap_or_default(),
        name: attrs::get_s(item, "name").unwrap_or_default(),
        picture: attrs::get_s(item, "picture"),
        created_at: attrs::get_time(item, "created_at")?,
        updated_at: attrs::get_time(item, "updated_at")?,
    })
}
