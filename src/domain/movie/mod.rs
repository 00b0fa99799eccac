//! The movie record and the types used to create, update, and query it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::MovieError;

pub mod input;
pub mod query;

pub use input::MovieInput;
pub use query::{ListParams, ListQuery, MovieFilter, Page, RatingFilter, SortField, TitleFilter};

/// Unique identifier of a movie, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    pub fn generate() -> Self {
        MovieId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for MovieId {
    fn from(id: Uuid) -> Self {
        MovieId(id)
    }
}

impl FromStr for MovieId {
    type Err = MovieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(MovieId)
            .map_err(|_| MovieError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// A loosely typed rating: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Number(serde_json::Number),
    Text(String),
}

impl Rating {
    /// Rebuilds a rating from its stored JSON form.
    pub fn from_json(value: JsonValue) -> Option<Rating> {
        match value {
            JsonValue::Null => None,
            JsonValue::Number(n) => Some(Rating::Number(n)),
            JsonValue::String(s) => Some(Rating::Text(s)),
            other => Some(Rating::Text(other.to_string())),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Rating::Number(n) => JsonValue::Number(n.clone()),
            Rating::Text(s) => JsonValue::String(s.clone()),
        }
    }

    pub fn matches(&self, filter: &RatingFilter) -> bool {
        match self {
            Rating::Text(s) => *s == filter.raw,
            Rating::Number(n) => match (n.as_f64(), filter.numeric) {
                (Some(stored), Some(wanted)) => stored == wanted,
                _ => false,
            },
        }
    }
}

// Numbers sort before text.
impl PartialOrd for Rating {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(match (self, other) {
            (Rating::Number(a), Rating::Number(b)) => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
            (Rating::Number(_), Rating::Text(_)) => Ordering::Less,
            (Rating::Text(_), Rating::Number(_)) => Ordering::Greater,
            (Rating::Text(a), Rating::Text(b)) => a.cmp(b),
        })
    }
}

/// The mutable part of a movie. Create and update both write all four fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFields {
    pub title: Option<String>,
    pub rating: Option<Rating>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[schema(value_type = String, format = Uuid)]
    pub id: MovieId,
    pub title: Option<String>,
    /// Either a number or a string.
    #[schema(value_type = Object)]
    pub rating: Option<Rating>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
}

impl Movie {
    pub fn new(id: MovieId, fields: MovieFields) -> Self {
        Self {
            id,
            title: fields.title,
            rating: fields.rating,
            description: fields.description,
            release_date: fields.release_date,
        }
    }

    /// Overwrites every mutable field; omitted values are cleared.
    pub fn replace_fields(&mut self, fields: MovieFields) {
        self.title = fields.title;
        self.rating = fields.rating;
        self.description = fields.description;
        self.release_date = fields.release_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movie_id_rejects_malformed_input() {
        let err = "not-an-id".parse::<MovieId>().unwrap_err();
        assert!(matches!(err, MovieError::InvalidId(_)));

        let id = MovieId::generate();
        assert_eq!(id.to_string().parse::<MovieId>().unwrap(), id);
    }

    #[test]
    fn rating_matches_numbers_numerically_and_text_verbatim() {
        let filter = RatingFilter::new("8");
        assert!(Rating::Number(8i64.into()).matches(&filter));
        assert!(Rating::Text("8".to_string()).matches(&filter));
        assert!(!Rating::Text("8.0".to_string()).matches(&filter));

        let text_filter = RatingFilter::new("PG-13");
        assert!(Rating::Text("PG-13".to_string()).matches(&text_filter));
        assert!(!Rating::Number(13i64.into()).matches(&text_filter));
    }

    #[test]
    fn numbers_order_before_text() {
        let low = Rating::Number(2i64.into());
        let high = Rating::Number(9i64.into());
        let text = Rating::Text("A".to_string());
        assert!(low < high);
        assert!(high < text);
    }

    #[test]
    fn movie_serializes_camel_case_with_nulls() {
        let id = MovieId::generate();
        let movie = Movie::new(
            id,
            MovieFields {
                title: Some("Heat".to_string()),
                ..MovieFields::default()
            },
        );
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["id"], json!(id.to_string()));
        assert_eq!(value["title"], json!("Heat"));
        assert_eq!(value["releaseDate"], JsonValue::Null);
        assert_eq!(value["rating"], JsonValue::Null);
    }
}
