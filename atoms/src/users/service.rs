use super::model::{user_from_item, UpdateUserPayload, User};
use crate::attrs;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tasklane_shared::{AuthContext, StoreError};

fn identity_pk(google_id: &str) -> String {
    format!("IDENT#{}", google_id)
}

/// Resolve the authenticated principal to its User record, if provisioned.
pub async fn get_user_by_identity(
    client: &DynamoClient,
    table_name: &str,
    google_id: &str,
) -> Result<Option<User>, StoreError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(identity_pk(google_id)))
        .key("SK", AttributeValue::S("IDENT".to_string()))
        .send()
        .await
        .map_err(|e| StoreError::dynamo("get_item", e))?;

    Ok(result.item().and_then(user_from_item))
}

/// Provision the User record for a first sign-in, or return the existing one.
/// The boolean is true when a new record was written.
pub async fn find_or_create_user(
    client: &DynamoClient,
    table_name: &str,
    auth: &AuthContext,
) -> Result<(User, bool), StoreError> {
    if let Some(user) = get_user_by_identity(client, table_name, &auth.subject).await? {
        return Ok((user, false));
    }

    let email = auth
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| StoreError::validation("An email claim is required to provision a user"))?;
    let name = auth
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or("User").to_string());

    let now = chrono::Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        google_id: auth.subject.clone(),
        email,
        name,
        picture: auth.picture.clone(),
        created_at: now,
        updated_at: now,
    };

    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(identity_pk(&user.google_id)))
        .item("SK", AttributeValue::S("IDENT".to_string()))
        .item("user_id", AttributeValue::S(user.id.clone()))
        .item("google_id", AttributeValue::S(user.google_id.clone()))
        .item("email", AttributeValue::S(user.email.clone()))
        .item("name", AttributeValue::S(user.name.clone()))
        .item("created_at", AttributeValue::S(attrs::encode_time(now)))
        .item("updated_at", AttributeValue::S(attrs::encode_time(now)))
        .condition_expression("attribute_not_exists(PK)");

    if let Some(picture) = &user.picture {
        builder = builder.item("picture", AttributeValue::S(picture.clone()));
    }

    match builder.send().await {
        Ok(_) => Ok((user, true)),
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_conditional_check_failed_exception() {
                // Lost a provisioning race; the record now exists.
                let existing = get_user_by_identity(client, table_name, &auth.subject)
                    .await?
                    .ok_or(StoreError::Dynamo {
                        operation: "put_item",
                        message: "identity row vanished after conditional put".to_string(),
                    })?;
                Ok((existing, false))
            } else {
                Err(StoreError::Dynamo {
                    operation: "put_item",
                    message: service_err.to_string(),
                })
            }
        }
    }
}

/// Update the profile fields of the current user.
pub async fn update_user(
    client: &DynamoClient,
    table_name: &str,
    google_id: &str,
    payload: UpdateUserPayload,
) -> Result<Option<User>, StoreError> {
    if payload.is_empty() {
        return Err(StoreError::validation("No fields to update"));
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
    if let Some(picture) = payload.picture {
        update_expr.push("#picture = :picture");
        expr_names.insert("#picture".to_string(), "picture".to_string());
        expr_values.insert(":picture".to_string(), AttributeValue::S(picture));
    }

    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(identity_pk(google_id)))
        .key("SK", AttributeValue::S("IDENT".to_string()))
        .update_expression(format!("SET {}", update_expr.join(", ")))
        .condition_expression("attribute_exists(PK)")
        .return_values(ReturnValue::AllNew);

    for (k, v) in expr_names {
        builder = builder.expression_attribute_names(k, v);
    }
    for (k, v) in expr_values {
        builder = builder.expression_attribute_values(k, v);
    }

    match builder.send().await {
        Ok(out) => Ok(out.attributes().and_then(user_from_item)),
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
