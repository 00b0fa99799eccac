pub mod movie_service;

pub use movie_service::{MoviePage, MovieService};
