use super::model::{task_from_item, CreateTaskPayload, Priority, Task, TaskOrder, UpdateTaskPayload};
use crate::attrs;
use crate::ordering::{self, ReorderOutcome};
use crate::{LIST_INDEX, USER_INDEX};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tasklane_shared::StoreError;

fn task_pk(task_id: &str) -> String {
    format!("TASK#{}", task_id)
}

fn list_gsi_pk(list_id: &str) -> String {
    format!("LIST#{}", list_id)
}

fn user_gsi_pk(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

/// All tasks in a list, ordered by `order` ascending with creation time
/// breaking ties. Scoped to the requesting user as well: list membership is
/// single-owner, the extra filter is defense in depth.
pub async fn list_tasks_by_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
    user_id: &str,
) -> Result<Vec<Task>, StoreError> {
    let result = client
        .query()
        .table_name(table_name)
        .index_name(LIST_INDEX)
        .key_condition_expression("GSI2PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S(list_gsi_pk(list_id)))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("query", e))?;

    let mut tasks: Vec<Task> = result
        .items()
        .iter()
        .filter_map(task_from_item)
        .filter(|t| t.user_id == user_id)
        .collect();
    ordering::sort_for_display(&mut tasks);
    Ok(tasks)
}

/// All tasks for a user, newest first. This is the global activity feed, not
/// a manually ordered view.
pub async fn list_tasks_by_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Vec<Task>, StoreError> {
    let result = client
        .query()
        .table_name(table_name)
        .index_name(USER_INDEX)
        .key_condition_expression("GSI1PK = :pk AND begins_with(GSI1SK, :prefix)")
        .expression_attribute_values(":pk", AttributeValue::S(user_gsi_pk(user_id)))
        .expression_attribute_values(":prefix", AttributeValue::S("TASK#".to_string()))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("query", e))?;

    let mut tasks: Vec<Task> = result.items().iter().filter_map(task_from_item).collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tasks)
}

/// Fetch one task by id, without ownership enforcement; the caller compares
/// `user_id` and decides what to reveal.
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Option<Task>, StoreError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(task_pk(task_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("get_item", e))?;

    Ok(result.item().and_then(task_from_item))
}

/// Highest order currently used in a list. Feeds the ordering policy when a
/// create or move does not carry an explicit order.
async fn max_order_in_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
) -> Result<Option<i64>, StoreError> {
    let result = client
        .query()
        .table_name(table_name)
        .index_name(LIST_INDEX)
        .key_condition_expression("GSI2PK = :pk")
        .expression_attribute_values(":pk", AttributeValue::S(list_gsi_pk(list_id)))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("query", e))?;

    Ok(result
        .items()
        .iter()
        .filter_map(|item| attrs::get_n(item, "order"))
        .max())
}

/// Create a task in a list. New tasks are never completed; priority defaults
/// to medium; an omitted order appends to the end of the list.
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    payload: CreateTaskPayload,
) -> Result<Task, StoreError> {
    let task_list_id = payload
        .task_list_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::validation("Valid taskListId is required"))?;
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| StoreError::validation("Title is required and must be a string"))?;

    let order = match payload.order {
        Some(order) => order,
        None => ordering::next_order(
            max_order_in_list(client, table_name, &task_list_id)
                .await?
                .into_iter(),
        ),
    };

    let now = chrono::Utc::now();
    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        task_list_id,
        user_id: user_id.to_string(),
        title,
        description: payload.description,
        due_date: payload.due_date,
        priority: payload.priority.unwrap_or_default(),
        notes: payload.notes,
        color: payload.color,
        completed: false,
        order,
        created_at: now,
        updated_at: now,
    };

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(task_pk(&task.id)))
        .item("SK", AttributeValue::S("META".to_string()))
        .item("GSI1PK", AttributeValue::S(user_gsi_pk(user_id)))
        .item("GSI1SK", AttributeValue::S(task_pk(&task.id)))
        .item("GSI2PK", AttributeValue::S(list_gsi_pk(&task.task_list_id)))
        .item("GSI2SK", AttributeValue::S(task_pk(&task.id)))
        .item("task_list_id", AttributeValue::S(task.task_list_id.clone()))
        .item("user_id", AttributeValue::S(user_id.to_string()))
        .item("title", AttributeValue::S(task.title.clone()))
        .item(
            "priority",
            AttributeValue::S(task.priority.as_str().to_string()),
        )
        .item("completed", AttributeValue::Bool(false))
        .item("order", AttributeValue::N(order.to_string()))
        .item("created_at", AttributeValue::S(attrs::encode_time(now)))
        .item("updated_at", AttributeValue::S(attrs::encode_time(now)));

    if let Some(description) = &task.description {
        builder = builder.item("description", AttributeValue::S(description.clone()));
    }
    if let Some(due_date) = task.due_date {
        builder = builder.item("due_date", AttributeValue::S(attrs::encode_time(due_date)));
    }
    if let Some(notes) = &task.notes {
        builder = builder.item("notes", AttributeValue::S(notes.clone()));
    }
    if let Some(color) = &task.color {
        builder = builder.item("color", AttributeValue::S(color.clone()));
    }

    builder
        .send()
        .await
        .map_err(|e| StoreError::dynamo("put_item", e))?;

    Ok(task)
}

/// Partial update scoped to `(task_id, user_id)`. Returns the post-update
/// state, or `None` when no document matches both.
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
    payload: UpdateTaskPayload,
) -> Result<Option<Task>, StoreError> {
    if payload.is_empty() {
        return Err(StoreError::validation("No fields to update"));
    }
    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return Err(StoreError::validation("Title is required and must be a string"));
        }
    }

    let mut set_expr = vec!["#updated_at = :updated_at"];
    let mut remove_expr: Vec<&str> = Vec::new();
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();
    expr_names.insert("#updated_at".to_string(), "updated_at".to_string());
    expr_values.insert(
        ":updated_at".to_string(),
        AttributeValue::S(attrs::encode_time(chrono::Utc::now())),
    );

    if let Some(title) = payload.title {
        set_expr.push("#title = :title");
        expr_names.insert("#title".to_string(), "title".to_string());
        expr_values.insert(":title".to_string(), AttributeValue::S(title));
    }
    if let Some(description) = payload.description {
        set_expr.push("#description = :description");
        expr_names.insert("#description".to_string(), "description".to_string());
        expr_values.insert(":description".to_string(), AttributeValue::S(description));
    }
    match payload.due_date {
        Some(Some(due_date)) => {
            set_expr.push("#due_date = :due_date");
            expr_names.insert("#due_date".to_string(), "due_date".to_string());
            expr_values.insert(
                ":due_date".to_string(),
                AttributeValue::S(attrs::encode_time(due_date)),
            );
        }
        Some(None) => {
            // Explicitly cleared, distinct from "left alone".
            remove_expr.push("#due_date");
            expr_names.insert("#due_date".to_string(), "due_date".to_string());
        }
        None => {}
    }
    if let Some(priority) = payload.priority {
        set_expr.push("#priority = :priority");
        expr_names.insert("#priority".to_string(), "priority".to_string());
        expr_values.insert(
            ":priority".to_string(),
            AttributeValue::S(priority.as_str().to_string()),
        );
    }
    if let Some(notes) = payload.notes {
        set_expr.push("#notes = :notes");
        expr_names.insert("#notes".to_string(), "notes".to_string());
        expr_values.insert(":notes".to_string(), AttributeValue::S(notes));
    }
    if let Some(color) = payload.color {
        set_expr.push("#color = :color");
        expr_names.insert("#color".to_string(), "color".to_string());
        expr_values.insert(":color".to_string(), AttributeValue::S(color));
    }
    if let Some(completed) = payload.completed {
        set_expr.push("#completed = :completed");
        expr_names.insert("#completed".to_string(), "completed".to_string());
        expr_values.insert(":completed".to_string(), AttributeValue::Bool(completed));
    }
    if let Some(order) = payload.order {
        set_expr.push("#order = :order");
        expr_names.insert("#order".to_string(), "order".to_string());
        expr_values.insert(":order".to_string(), AttributeValue::N(order.to_string()));
    }

    let mut update_expression = format!("SET {}", set_expr.join(", "));
    if !remove_expr.is_empty() {
        update_expression.push_str(&format!(" REMOVE {}", remove_expr.join(", ")));
    }

    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(task_pk(task_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .update_expression(update_expression)
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
        Ok(out) => Ok(out.attributes().and_then(task_from_item)),
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

/// Flip `completed`. Read-then-write on the single task item; concurrent
/// toggles from the same user are last-writer-wins by design.
pub async fn toggle_task_completion(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
) -> Result<Option<Task>, StoreError> {
    let current = match get_task(client, table_name, task_id).await? {
        Some(task) if task.user_id == user_id => task,
        _ => return Ok(None),
    };

    let payload = UpdateTaskPayload {
        completed: Some(!current.completed),
        ..Default::default()
    };
    update_task(client, table_name, task_id, user_id, payload).await
}

/// Delete a task owned by the user.
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
) -> Result<bool, StoreError> {
    let result = client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(task_pk(task_id)))
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

/// Delete every task the user owns in a list, returning the count. One
/// delete per item, no transaction; a failure partway leaves earlier deletes
/// committed.
pub async fn delete_tasks_by_list(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
    user_id: &str,
) -> Result<u64, StoreError> {
    let tasks = list_tasks_by_list(client, table_name, list_id, user_id).await?;

    let mut deleted = 0u64;
    for task in tasks {
        if delete_task(client, table_name, &task.id, user_id).await? {
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Re-home a task: rewrite `task_list_id` and `order` in one update. Tasks
/// left behind in the source list keep their orders; gaps are fine.
pub async fn move_task_to_list(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    user_id: &str,
    new_task_list_id: &str,
    new_order: Option<i64>,
) -> Result<Option<Task>, StoreError> {
    let order = match new_order {
        Some(order) => order,
        None => ordering::next_order(
            max_order_in_list(client, table_name, new_task_list_id)
                .await?
                .into_iter(),
        ),
    };

    let builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(task_pk(task_id)))
        .key("SK", AttributeValue::S("META".to_string()))
        .update_expression(
            "SET task_list_id = :list_id, GSI2PK = :gsi2pk, #order = :order, \
             #updated_at = :updated_at",
        )
        .condition_expression("user_id = :uid")
        .expression_attribute_names("#order", "order")
        .expression_attribute_names("#updated_at", "updated_at")
        .expression_attribute_values(":list_id", AttributeValue::S(new_task_list_id.to_string()))
        .expression_attribute_values(":gsi2pk", AttributeValue::S(list_gsi_pk(new_task_list_id)))
        .expression_attribute_values(":order", AttributeValue::N(order.to_string()))
        .expression_attribute_values(
            ":updated_at",
            AttributeValue::S(attrs::encode_time(chrono::Utc::now())),
        )
        .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
        .return_values(ReturnValue::AllNew);

    match builder.send().await {
        Ok(out) => Ok(out.attributes().and_then(task_from_item)),
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

/// Apply caller-supplied absolute orders, one scoped write per entry.
/// Same weak batch guarantee as the task-list reorder.
pub async fn reorder_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    orders: Vec<TaskOrder>,
) -> Result<ReorderOutcome, StoreError> {
    let mut outcome = ReorderOutcome::default();
    let updated_at = attrs::encode_time(chrono::Utc::now());

    for entry in orders {
        let result = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S(task_pk(&entry.task_id)))
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
                    outcome.skipped.push(entry.task_id);
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
            "reorder skipped tasks not owned by the requester"
        );
    }
    Ok(outcome)
}

/// Tasks of a given priority, soonest due first. No route exposes this yet;
/// it backs the dashboard's priority filter.
pub async fn tasks_by_priority(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    priority: Priority,
) -> Result<Vec<Task>, StoreError> {
    let tasks = list_tasks_by_user(client, table_name, user_id).await?;
    Ok(filter_by_priority(tasks, priority))
}

/// Incomplete tasks due within `[now, now + days]`, soonest first.
pub async fn upcoming_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    days: i64,
) -> Result<Vec<Task>, StoreError> {
    let tasks = list_tasks_by_user(client, table_name, user_id).await?;
    Ok(filter_upcoming(tasks, chrono::Utc::now(), days))
}

/// Incomplete tasks whose due date has passed, oldest first.
pub async fn overdue_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Vec<Task>, StoreError> {
    let tasks = list_tasks_by_user(client, table_name, user_id).await?;
    Ok(filter_overdue(tasks, chrono::Utc::now()))
}

// Derived views, pure over an already-fetched task set. DynamoDB cannot sort
// on an arbitrary attribute, so filtering and ordering happen here.

fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
        // Undated tasks sort last.
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn filter_by_priority(mut tasks: Vec<Task>, priority: Priority) -> Vec<Task> {
    tasks.retain(|t| t.priority == priority);
    sort_by_due_date(&mut tasks);
    tasks
}

fn filter_upcoming(mut tasks: Vec<Task>, now: DateTime<Utc>, days: i64) -> Vec<Task> {
    // A window too large for the time type is effectively unbounded.
    let end = Duration::try_days(days).and_then(|window| now.checked_add_signed(window));
    tasks.retain(|t| {
        !t.completed
            && t.due_date
                .is_some_and(|due| due >= now && end.map_or(true, |end| due <= end))
    });
    sort_by_due_date(&mut tasks);
    tasks
}

fn filter_overdue(mut tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<Task> {
    tasks.retain(|t| !t.completed && t.due_date.is_some_and(|due| due < now));
    sort_by_due_date(&mut tasks);
    tasks
}
