//! In-process movie store.

use super::{MovieStore, StoreResult};
use crate::domain::movie::{Movie, MovieFields, MovieFilter, MovieId, SortField};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps movies in insertion order behind a `RwLock`.
#[derive(Default)]
pub struct InMemoryMovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn insert(&self, fields: MovieFields) -> StoreResult<Movie> {
        let movie = Movie::new(MovieId::generate(), fields);
        self.movies.write().await.push(movie.clone());
        Ok(movie)
    }

    async fn find(
        &self,
        filter: &MovieFilter,
        sort: Option<SortField>,
        skip: u64,
        limit: u32,
    ) -> StoreResult<Vec<Movie>> {
        let movies = self.movies.read().await;
        let mut matching: Vec<&Movie> = movies.iter().filter(|m| filter.matches(m)).collect();
        if let Some(field) = sort {
            // Stable, so ties keep insertion order.
            matching.sort_by(|a, b| field.compare(a, b));
        }
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &MovieFilter) -> StoreResult<u64> {
        let movies = self.movies.read().await;
        Ok(movies.iter().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.id == id).cloned())
    }

    async fn replace(&self, id: MovieId, fields: MovieFields) -> StoreResult<Option<Movie>> {
        let mut movies = self.movies.write().await;
        Ok(movies.iter_mut().find(|m| m.id == id).map(|movie| {
            movie.replace_fields(fields);
            movie.clone()
        }))
    }

    async fn delete(&self, id: MovieId) -> StoreResult<bool> {
        let mut movies = self.movies.write().await;
        match movies.iter().position(|m| m.id == id) {
            Some(idx) => {
                movies.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movie::{Rating, RatingFilter, TitleFilter};

    fn titled(title: &str, rating: Option<Rating>) -> MovieFields {
        MovieFields {
            title: Some(title.to_string()),
            rating,
            ..MovieFields::default()
        }
    }

    async fn seeded() -> InMemoryMovieStore {
        let store = InMemoryMovieStore::new();
        store.insert(titled("The Matrix", Some(Rating::Number(9i64.into())))).await.unwrap();
        store.insert(titled("Alien", Some(Rating::Text("R".to_string())))).await.unwrap();
        store.insert(titled("The Matrix Reloaded", Some(Rating::Number(7i64.into())))).await.unwrap();
        store.insert(titled("Blade Runner", None)).await.unwrap();
        store
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().filter_map(|m| m.title.as_deref()).collect()
    }

    #[tokio::test]
    async fn find_keeps_insertion_order_without_sort() {
        let store = seeded().await;
        let all = store.find(&MovieFilter::default(), None, 0, 10).await.unwrap();
        assert_eq!(
            titles(&all),
            vec!["The Matrix", "Alien", "The Matrix Reloaded", "Blade Runner"]
        );
    }

    #[tokio::test]
    async fn find_pages_and_sorts() {
        let store = seeded().await;
        let page = store
            .find(&MovieFilter::default(), Some(SortField::Title), 1, 2)
            .await
            .unwrap();
        assert_eq!(titles(&page), vec!["Blade Runner", "The Matrix"]);

        let by_rating = store
            .find(&MovieFilter::default(), Some(SortField::Rating), 0, 10)
            .await
            .unwrap();
        assert_eq!(
            titles(&by_rating),
            vec!["Blade Runner", "The Matrix Reloaded", "The Matrix", "Alien"]
        );
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let store = seeded().await;
        let filter = MovieFilter {
            title: Some(TitleFilter::Contains("matrix".to_string())),
            rating: None,
        };
        assert_eq!(store.count(&filter).await.unwrap(), 2);
        assert_eq!(store.find(&filter, None, 0, 1).await.unwrap().len(), 1);

        let filter = MovieFilter {
            title: None,
            rating: Some(RatingFilter::new("R")),
        };
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn replace_and_delete_report_missing_ids() {
        let store = seeded().await;
        let missing = MovieId::generate();
        assert!(store.replace(missing, MovieFields::default()).await.unwrap().is_none());
        assert!(!store.delete(missing).await.unwrap());

        let movie = store.insert(titled("Heat", None)).await.unwrap();
        let replaced = store.replace(movie.id, MovieFields::default()).await.unwrap().unwrap();
        assert_eq!(replaced.title, None);
        assert!(store.delete(movie.id).await.unwrap());
        assert!(store.get(movie.id).await.unwrap().is_none());
    }
}
