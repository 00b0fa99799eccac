//! Postgres-backed movie store.

use super::{MovieStore, StoreError, StoreResult};
use crate::domain::movie::{
    Movie, MovieFields, MovieFilter, MovieId, Rating, SortField, TitleFilter,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

const MOVIE_COLUMNS: &str = "id, title, rating, description, release_date";

/// Stores movies in a single `movies` table.
///
/// `rating` is a JSONB column so numbers and text round-trip unchanged. `seq`
/// records insertion order and breaks ties when sorting.
#[derive(Clone)]
pub struct PostgresMovieStore {
    pool: PgPool,
}

impl PostgresMovieStore {
    /// Connects to the database and makes sure the `movies` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS movies (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                title TEXT,
                rating JSONB,
                description TEXT,
                release_date TIMESTAMPTZ
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS movies_seq_idx ON movies (seq)")
            .execute(&self.pool)
            .await?;

        info!("movies table ready");
        Ok(())
    }

    /// Removes every movie. Used by tests and local resets.
    pub async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM movies").execute(&self.pool).await?;
        Ok(())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

fn movie_from_row(row: &PgRow) -> StoreResult<Movie> {
    let id: Uuid = row.try_get("id")?;
    let rating: Option<JsonValue> = row.try_get("rating")?;
    let release_date: Option<DateTime<Utc>> = row.try_get("release_date")?;
    Ok(Movie::new(
        MovieId::from(id),
        MovieFields {
            title: row.try_get("title")?,
            rating: rating.and_then(Rating::from_json),
            description: row.try_get("description")?,
            release_date,
        },
    ))
}

/// Escapes `ILIKE` metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &MovieFilter) {
    qb.push(" WHERE TRUE");

    match &filter.title {
        Some(TitleFilter::Exact(title)) => {
            qb.push(" AND title = ").push_bind(title.clone());
        }
        Some(TitleFilter::Contains(needle)) => {
            qb.push(" AND title ILIKE ")
                .push_bind(like_pattern(needle))
                .push(" ESCAPE '\\'");
        }
        None => {}
    }

    if let Some(rating) = &filter.rating {
        qb.push(" AND (rating = to_jsonb(")
            .push_bind(rating.raw.clone())
            .push("::text)");
        if let Some(n) = rating.numeric {
            qb.push(" OR CASE WHEN jsonb_typeof(rating) = 'number' THEN (rating #>> '{}')::float8 END = ")
                .push_bind(n);
        }
        qb.push(")");
    }
}

// Ascending, absent values first, insertion order on ties. Numbers sort before text.
fn order_clause(sort: Option<SortField>) -> &'static str {
    match sort {
        None => " ORDER BY seq",
        Some(SortField::Id) => " ORDER BY id, seq",
        Some(SortField::Title) => " ORDER BY title COLLATE \"C\" ASC NULLS FIRST, seq",
        Some(SortField::Description) => {
            " ORDER BY description COLLATE \"C\" ASC NULLS FIRST, seq"
        }
        Some(SortField::ReleaseDate) => " ORDER BY release_date ASC NULLS FIRST, seq",
        Some(SortField::Rating) => {
            " ORDER BY jsonb_typeof(rating) = 'string' ASC NULLS FIRST, \
             CASE WHEN jsonb_typeof(rating) = 'number' THEN (rating #>> '{}')::float8 END ASC, \
             CASE WHEN jsonb_typeof(rating) = 'string' THEN rating #>> '{}' END COLLATE \"C\" ASC, \
             seq"
        }
    }
}

#[async_trait]
impl MovieStore for PostgresMovieStore {
    async fn insert(&self, fields: MovieFields) -> StoreResult<Movie> {
        let sql = format!(
            "INSERT INTO movies (id, title, rating, description, release_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(MovieId::generate().as_uuid())
            .bind(fields.title)
            .bind(fields.rating.as_ref().map(Rating::to_json))
            .bind(fields.description)
            .bind(fields.release_date)
            .fetch_one(&self.pool)
            .await?;
        movie_from_row(&row)
    }

    async fn find(
        &self,
        filter: &MovieFilter,
        sort: Option<SortField>,
        skip: u64,
        limit: u32,
    ) -> StoreResult<Vec<Movie>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM movies", MOVIE_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(order_clause(sort));
        qb.push(" LIMIT ").push_bind(i64::from(limit));
        let offset = i64::try_from(skip)
            .map_err(|_| StoreError::Backend(format!("offset {} out of range", skip)))?;
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(movie_from_row).collect()
    }

    async fn count(&self, filter: &MovieFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(movie_from_row).transpose()
    }

    async fn replace(&self, id: MovieId, fields: MovieFields) -> StoreResult<Option<Movie>> {
        let sql = format!(
            "UPDATE movies
             SET title = $2, rating = $3, description = $4, release_date = $5
             WHERE id = $1
             RETURNING {}",
            MOVIE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(fields.title)
            .bind(fields.rating.as_ref().map(Rating::to_json))
            .bind(fields.description)
            .bind(fields.release_date)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(movie_from_row).transpose()
    }

    async fn delete(&self, id: MovieId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movie::RatingFilter;
    use crate::error::MovieError;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Matrix"), "%Matrix%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    #[test]
    fn filter_sql_binds_every_value() {
        let filter = MovieFilter {
            title: Some(TitleFilter::Contains("matrix".to_string())),
            rating: Some(RatingFilter::new("8")),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("title ILIKE $1 ESCAPE '\\'"));
        assert!(sql.contains("to_jsonb($2::text)"));
        assert!(sql.contains("::float8 END = $3"));
        assert!(!sql.contains("matrix"));
    }

    #[test]
    fn text_ratings_sort_bytewise() {
        let clause = order_clause(Some(SortField::Rating));
        assert!(clause.contains("THEN rating #>> '{}' END COLLATE \"C\" ASC"));
        assert!(clause.contains("::float8 END ASC"));
        assert!(clause.trim_end().ends_with("seq"));
        assert!(order_clause(Some(SortField::Title)).contains("COLLATE \"C\""));
    }

    #[test]
    fn connection_failures_are_unavailable_and_the_rest_internal() {
        for err in [sqlx::Error::PoolTimedOut, sqlx::Error::PoolClosed] {
            let store_err = StoreError::from(err);
            assert!(matches!(store_err, StoreError::Unavailable(_)));
            assert!(matches!(
                MovieError::from(store_err),
                MovieError::StorageUnavailable(_)
            ));
        }

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            MovieError::from(StoreError::from(sqlx::Error::Io(io))),
            MovieError::StorageUnavailable(_)
        ));

        let store_err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(store_err, StoreError::Backend(_)));
        assert!(matches!(MovieError::from(store_err), MovieError::Internal(_)));
    }

    #[test]
    fn text_ratings_skip_numeric_comparison() {
        let filter = MovieFilter {
            title: None,
            rating: Some(RatingFilter::new("PG-13")),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter(&mut qb, &filter);
        assert!(!qb.sql().contains("float8"));
    }
}
