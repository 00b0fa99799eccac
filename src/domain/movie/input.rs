//! Request-body validation and type coercion for create and update.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::{MovieFields, Rating};
use crate::error::MovieError;

/// Raw movie payload as received on the wire.
///
/// Every field is optional. Values are kept untyped until [`MovieInput::validate`]
/// so that type mismatches surface as validation errors rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieInput {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: Option<JsonValue>,
    /// Number or string.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub rating: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Option<JsonValue>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub release_date: Option<JsonValue>,
}

impl MovieInput {
    pub fn validate(self) -> Result<MovieFields, MovieError> {
        Ok(MovieFields {
            title: coerce_text("title", self.title)?,
            rating: coerce_rating(self.rating)?,
            description: coerce_text("description", self.description)?,
            release_date: coerce_date(self.release_date)?,
        })
    }
}

fn type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// Scalars stringify for text fields.
fn coerce_text(field: &str, value: Option<JsonValue>) -> Result<Option<String>, MovieError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(v @ (JsonValue::Number(_) | JsonValue::Bool(_))) => Ok(Some(v.to_string())),
        Some(v) => Err(MovieError::Validation(format!(
            "{}: expected string, got {}",
            field,
            type_name(&v)
        ))),
    }
}

fn coerce_rating(value: Option<JsonValue>) -> Result<Option<Rating>, MovieError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(Some(Rating::Number(n))),
        Some(JsonValue::String(s)) => Ok(Some(Rating::Text(s))),
        Some(v) => Err(MovieError::Validation(format!(
            "rating: expected number or string, got {}",
            type_name(&v)
        ))),
    }
}

fn coerce_date(value: Option<JsonValue>) -> Result<Option<DateTime<Utc>>, MovieError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => parse_date(&s).map(Some).ok_or_else(|| {
            MovieError::Validation(format!(
                "releaseDate: expected RFC 3339 timestamp or YYYY-MM-DD, got {:?}",
                s
            ))
        }),
        // Epoch milliseconds.
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Some)
            .ok_or_else(|| MovieError::Validation(format!("releaseDate: {} is out of range", n))),
        Some(v) => Err(MovieError::Validation(format!(
            "releaseDate: expected date string, got {}",
            type_name(&v)
        ))),
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
