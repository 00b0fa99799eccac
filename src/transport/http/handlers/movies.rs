use crate::app::MoviePage;
use crate::domain::movie::{ListQuery, Movie, MovieInput};
use crate::transport::http::handlers::common::{json_body, path_param, query_params};
use crate::transport::http::types::{AppState, MessageResponse};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/movies",
    request_body = MovieInput,
    responses(
        (status = 201, description = "Movie created", body = Movie),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
        (status = 503, description = "Storage unavailable", body = MessageResponse)
    )
)]
pub async fn create_movie_handler(
    State(state): State<AppState>,
    request: Result<Json<MovieInput>, JsonRejection>,
) -> Response {
    let input = match json_body(request) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.service.create(input).await {
        Ok(movie) => (StatusCode::CREATED, Json(movie)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/movies",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of matching movies", body = MoviePage),
        (status = 400, description = "Invalid paging, sort or filter parameters", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
        (status = 503, description = "Storage unavailable", body = MessageResponse)
    )
)]
pub async fn list_movies_handler(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.service.list(query).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie id (UUID)")
    ),
    responses(
        (status = 200, description = "The movie", body = Movie),
        (status = 400, description = "Malformed id", body = MessageResponse),
        (status = 404, description = "Movie not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn get_movie_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match path_param(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.service.get(&id).await {
        Ok(movie) => Json(movie).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie id (UUID)")
    ),
    request_body = MovieInput,
    responses(
        (status = 200, description = "Movie replaced; omitted fields are cleared", body = Movie),
        (status = 400, description = "Malformed id or validation failed", body = MessageResponse),
        (status = 404, description = "Movie not found", body = MessageResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn update_movie_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    request: Result<Json<MovieInput>, JsonRejection>,
) -> Response {
    let id = match path_param(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let input = match json_body(request) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.service.update(&id, input).await {
        Ok(movie) => Json(movie).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie id (UUID)")
    ),
    responses(
        (status = 200, description = "Movie deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = MessageResponse),
        (status = 404, description = "Movie not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn delete_movie_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match path_param(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match state.service.delete(&id).await {
        Ok(()) => Json(MessageResponse::new("Movie deleted")).into_response(),
        Err(e) => e.into_response(),
    }
}
