//! Movie storage backends.
//!
//! [`MovieStore`] is the only seam between the service and persistence. Two
//! implementations exist: [`PostgresMovieStore`] for deployments and
//! [`InMemoryMovieStore`] for local runs and tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMovieStore;
pub use postgres::PostgresMovieStore;

use crate::domain::movie::{Movie, MovieFields, MovieFilter, MovieId, SortField};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached (connection refused, pool exhausted, ...).
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait MovieStore: Send + Sync + 'static {
    /// Persists a new movie under a freshly generated id.
    async fn insert(&self, fields: MovieFields) -> StoreResult<Movie>;

    /// Returns one page of movies matching `filter`, sorted ascending by `sort`
    /// (insertion order when `None`).
    async fn find(
        &self,
        filter: &MovieFilter,
        sort: Option<SortField>,
        skip: u64,
        limit: u32,
    ) -> StoreResult<Vec<Movie>>;

    /// Counts every movie matching `filter`, ignoring pagination.
    async fn count(&self, filter: &MovieFilter) -> StoreResult<u64>;

    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>>;

    /// Overwrites all mutable fields. Returns `None` if the id does not exist.
    async fn replace(&self, id: MovieId, fields: MovieFields) -> StoreResult<Option<Movie>>;

    /// Returns `true` if the movie existed and was removed.
    async fn delete(&self, id: MovieId) -> StoreResult<bool>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
