use crate::app::MoviePage;
use crate::domain::movie::{Movie, MovieInput};
use crate::transport::http::handlers::{health, movies};
use crate::transport::http::types::{AppState, HealthResponse, MessageResponse};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        movies::create_movie_handler,
        movies::list_movies_handler,
        movies::get_movie_handler,
        movies::update_movie_handler,
        movies::delete_movie_handler
    ),
    components(schemas(Movie, MovieInput, MoviePage, MessageResponse, HealthResponse))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/movies",
            get(movies::list_movies_handler).post(movies::create_movie_handler),
        )
        .route(
            "/movies/:id",
            get(movies::get_movie_handler)
                .put(movies::update_movie_handler)
                .delete(movies::delete_movie_handler),
        )
        .with_state(app_state)
}
