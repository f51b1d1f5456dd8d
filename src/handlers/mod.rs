pub mod department;
pub mod employee;

use actix_web::web;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::errors::AppError;

/// Path ids that are not UUIDs cannot name an existing record.
fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", what)))
}

/// Lets `Option<Option<T>>` tell an explicit `null` apart from a missing field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Surrounding whitespace is not part of a stored name.
fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

fn deserialize_trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.map(|v| v.trim().to_string()))
}

/// Resolves a deferred JSON body once the request has passed auth and lookups.
fn json_body<T>(body: Result<web::Json<T>, actix_web::Error>) -> Result<T, AppError> {
    body.map(web::Json::into_inner).map_err(|err| match err.as_error::<AppError>() {
        Some(AppError::InvalidRequest(msg)) => AppError::InvalidRequest(msg.clone()),
        _ => AppError::InvalidRequest(err.to_string()),
    })
}
