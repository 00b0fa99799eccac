pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{MoviePage, MovieService};
pub use domain::movie::{Movie, MovieId, MovieInput};
pub use error::MovieError;
pub use infra::config::{AppConfig, StorageBackend};
pub use storage::{InMemoryMovieStore, MovieStore, PostgresMovieStore};
