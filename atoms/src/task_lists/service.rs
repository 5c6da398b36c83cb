use super::model::{
    task_list_from_item, CreateTaskListPayload, TaskList, TaskListOrder, UpdateTaskListPayload,
};
use crate::attrs;
use crate::ordering::{self, ReorderOutcome};
use crate::USER_INDEX;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tasklane_shared::StoreError;

fn list_pk(list_id: &str) -> String {
    format!("LIST#{}", list_id)
}

fn user_gsi_pk(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

/// All task lists for a user, ordered by `order` ascending with creation time
/// breaking ties.
pub async fn list_task_lists(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Vec<TaskList>, StoreError> {
    let result = client
        .query()
        .table_name(table_name)
        .index_name(USER_INDEX)
        .key_condition_expression("GSI1PK = :pk AND begins_with(GSI1SK, :prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(user_gsi_pk(user_id)))
        .expression_attribute_values(":prefix", AttributeValue::S("LIST#".to_string()))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("query", e))?;

    let mut lists: Vec<TaskList> = result
        .items()
        .iter()
        .filter_map(task_list_from_item)
        .collect();
    ordering::sort_for_display(&mut lists);
    Ok(lists)
}

/// Fetch one task list by id. Ownership is NOT checked here; the read path
/// exposes `user_id` and the caller decides between 200 and 403.
pub async fn get_task_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
) -> Result<Option<TaskList>, StoreError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(list_pk(list_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("get_item", e))?;

    Ok(result.item().and_then(task_list_from_item))
}

/// Create a task list. When no explicit order is supplied the list is placed
/// one past the user's current maximum.
pub async fn create_task_list(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    payload: CreateTaskListPayload,
) -> Result<TaskList, StoreError> {
    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| StoreError::validation("Name is required and must be a string"))?;

    let order = match payload.order {
        Some(order) => order,
        None => {
            let siblings = list_task_lists(client, table_name, user_id).await?;
            ordering::next_order(siblings.iter().map(|l| l.order))
        }
    };

    let now = chrono::Utc::now();
    let list = TaskList {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name,
        description: payload.description,
        color: payload.color,
        order,
        created_at: now,
        updated_at: now,
    };

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(list_pk(&list.id)))
        .item("SK", AttributeValue::S("META".to_string()))
        .item("GSI1PK", AttributeValue::S(user_gsi_pk(user_id)))
        .item("GSI1SK", AttributeValue::S(list_pk(&list.id)))
        .item("user_id", AttributeValue::S(user_id.to_string()))
        .item("name", AttributeValue::S(list.name.clone()))
        .item("order", AttributeValue::N(order.to_string()))
        .item("created_at", AttributeValue::S(attrs::encode_time(now)))
        .item("updated_at", AttributeValue::S(attrs::encode_time(now)));

    if let Some(description) = &list.description {
        builder = builder.item("description", AttributeValue::S(description.clone()));
    }
    if let Some(color) = &list.color {
        builder = builder.item("color", AttributeValue::S(color.clone()));
    }

    builder
        .send()
        .await
        .map_err(|e| StoreError::dynamo("put_item", e))?;

    Ok(list)
}

/// Partial update scoped to `(list_id, user_id)`. Returns the post-update
/// state, or `None` when no document matches both.
pub async fn update_task_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
    user_id: &str,
    payload: UpdateTaskListPayload,
) -> Result<Option<TaskList>, StoreError> {
    if payload.is_empty() {
        return Err(StoreError::validation("No fields to update"));
    }
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(StoreError::validation("Name is required and must be a string"));
        }
    }

    let mut update_expr = vec!["#updated_at = :updated_at"];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();
    expr_names.insert("#updated_at".to_string(), "updated_at".to_string());
    expr_values.insert(
        ":updated_at".to_string(),
        AttributeValue::S(attrs::encode_time(chrono::Utc::now())),
    );

    if let Some(name) = payload.name {
        update_expr.push("#name = :name");
        expr_names.insert("#name".to_string(), "name".to_string());
        expr_values.insert(":name".to_string(), AttributeValue::S(name));
    }
    if let Some(description) = payload.description {
        update_expr.push("#description = :description");
        expr_names.insert("#description".to_string(), "description".to_string());
        expr_values.insert(":description".to_string(), AttributeValue::S(description));
    }
    if let Some(color) = payload.color {
        update_expr.push("#color = :color");
        expr_names.insert("#color".to_string(), "color".to_string());
        expr_values.insert(":color".to_string(), AttributeValue::S(color));
    }
    if let Some(order) = payload.order {
        update_expr.push("#order = :order");
        expr_names.insert("#order".to_string(), "order".to_string());
        expr_values.insert(":order".to_string(), AttributeValue::N(order.to_string()));
    }

    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(list_pk(list_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .update_expression(format!("SET {}", update_expr.join(", ")))
        .condition_expression("user_id = :uid")
        .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
        .return_values(ReturnValue::AllNew);

    for (k, v) in expr_names {
        builder = builder.expression_attribute_names(k, v);
    }
    for (k, v) in expr_values {
        builder = builder.expression_attribute_values(k, v);
    }

    match builder.send().await {
        Ok(out) => Ok(out.attributes().and_then(task_list_from_item)),
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_conditional_check_failed_exception() {
                Ok(None)
            } else {
                Err(StoreError::Dynamo {
                    operation: "update_item",
                    message: service_err.to_string(),
                })
            }
        }
    }
}

/// Delete a task list owned by the user. Member tasks are NOT touched here;
/// the cascade above both stores is responsible for them.
pub async fn delete_task_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
    user_id: &str,
) -> Result<bool, StoreError> {
    let result = client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(list_pk(list_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .condition_expression("user_id = :uid")
        .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
        .send()
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_conditional_check_failed_exception() {
                Ok(false)
            } else {
                Err(StoreError::Dynamo {
                    operation: "delete_item",
                    message: service_err.to_string(),
                })
            }
        }
    }
}

/// Apply caller-supplied absolute orders. Each entry is scoped to
/// `(list_id, user_id)`; entries that fail that check are skipped. The batch
/// is a sequence of single-item writes, not a transaction.
pub async fn reorder_task_lists(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    orders: Vec<TaskListOrder>,
) -> Result<ReorderOutcome, StoreError> {
    let mut outcome = ReorderOutcome::default();
    let updated_at = attrs::encode_time(chrono::Utc::now());

    for entry in orders {
        let result = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(list_pk(&entry.task_list_id)))
            .key("SK", AttributeValue::S("META".to_string()))
            .update_expression("SET #order = :order, #updated_at = :updated_at")
            .condition_expression("user_id = :uid")
            .expression_attribute_names("#order", "order")
            .expression_attribute_names("#updated_at", "updated_at")
            .expression_attribute_values(":order", AttributeValue::N(entry.order.to_string()))
            .expression_attribute_values(":updated_at", AttributeValue::S(updated_at.clone()))
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => outcome.updated += 1,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    outcome.skipped.push(entry.task_list_id);
                } else {
                    return Err(StoreError::Dynamo {
                        operation: "update_item",
                        message: service_err.to_string(),
                    });
                }
            }
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::warn!(
            skipped = outcome.skipped.len(),
            "reorder skipped task lists not owned by the requester"
        );
    }
    Ok(outcome)
}
