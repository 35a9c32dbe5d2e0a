//! Book endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use stacks_engine::{BookView, Deleted, NewBook, SearchQuery, SearchResults};

use super::parse_id;
use crate::error::Result;
use crate::handlers::{handle_add_book, handle_delete_book, handle_get_book, handle_search_books};
use crate::AppState;

/// Create book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/books", post(add_handler))
        .route("/api/books/search", get(search_handler))
        .route("/api/books/{id}", get(get_handler).delete(delete_handler))
}

/// POST /api/books
async fn add_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<BookView>> {
    let Json(request) = payload?;
    Ok(Json(handle_add_book(&state.library, request).await?))
}

/// GET /api/books/search
async fn search_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>> {
    let Query(query) = query?;
    Ok(Json(handle_search_books(&state.library, query).await?))
}

/// GET /api/books/{id}
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookView>> {
    let book_id = parse_id("book", &id)?;
    Ok(Json(handle_get_book(&state.library, book_id).await?))
}

/// DELETE /api/books/{id}
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let book_id = parse_id("book", &id)?;
    Ok(Json(handle_delete_book(&state.library, book_id).await?))
}
