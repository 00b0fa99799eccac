//! The movie collection service.
//!
//! Every operation validates its input first, then performs the storage call(s)
//! and shapes the result. The service owns no mutable state of its own; all
//! state lives behind the injected [`MovieStore`].

use crate::domain::movie::{ListQuery, Movie, MovieId, MovieInput};
use crate::error::{MovieError, Result};
use crate::storage::MovieStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

/// One page of a movie listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub total_pages: u64,
    pub current_page: u32,
}

pub struct MovieService {
    store: Arc<dyn MovieStore>,
}

impl MovieService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: MovieInput) -> Result<Movie> {
        let fields = input.validate()?;
        let movie = self.store.insert(fields).await?;
        info!(movie_id = %movie.id, "movie created");
        Ok(movie)
    }

    pub async fn list(&self, query: ListQuery) -> Result<MoviePage> {
        let params = query.normalize()?;
        let page = params.page;

        let movies = self
            .store
            .find(&params.filter, params.sort, page.skip(), page.limit)
            .await?;
        let count = self.store.count(&params.filter).await?;

        debug!(
            returned = movies.len(),
            matching = count,
            page = page.number,
            limit = page.limit,
            "movies listed"
        );

        Ok(MoviePage {
            movies,
            total_pages: page.total_pages(count),
            current_page: page.number,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Movie> {
        let id: MovieId = id.parse()?;
        self.store.get(id).await?.ok_or(MovieError::NotFound)
    }

    /// Replaces all four fields; omitted fields are cleared.
    pub async fn update(&self, id: &str, input: MovieInput) -> Result<Movie> {
        let id: MovieId = id.parse()?;
        let fields = input.validate()?;
        let movie = self
            .store
            .replace(id, fields)
            .await?
            .ok_or(MovieError::NotFound)?;
        info!(movie_id = %id, "movie updated");
        Ok(movie)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id: MovieId = id.parse()?;
        if !self.store.delete(id).await? {
            return Err(MovieError::NotFound);
        }
        info!(movie_id = %id, "movie deleted");
        Ok(())
    }

    /// Fails with `StorageUnavailable` when the store cannot be reached.
    pub async fn health(&self) -> Result<()> {
        self.store.ping().await.map_err(MovieError::from)
    }
}
