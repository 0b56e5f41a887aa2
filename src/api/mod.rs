pub mod auth;
pub mod authors;
pub mod bookcases;
pub mod books;
pub mod health;
pub mod slots;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::domain::DomainError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_me))
        // Bookcases
        .route(
            "/bookcases",
            get(bookcases::list_bookcases).post(bookcases::create_bookcase),
        )
        .route(
            "/bookcases/:id",
            get(bookcases::get_bookcase)
                .put(bookcases::update_bookcase)
                .delete(bookcases::delete_bookcase),
        )
        .route("/bookcases/:id/slots", get(slots::list_bookcase_slots))
        // Slots (the book form's selection set)
        .route("/slots", get(slots::list_slots))
        // Authors
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/picture", post(books::upload_picture))
        .with_state(state)
}

/// Translate a domain error into the JSON body the dashboard client
/// renders. Storage details never leak past the log.
pub(crate) fn error_response(err: DomainError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Database(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{}", err);
        (
            status,
            Json(json!({ "error": "Something went wrong. Please check form errors" })),
        )
    } else {
        (status, Json(json!({ "error": err.to_string() })))
    }
}
