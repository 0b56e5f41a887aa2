use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::AuthorFilter;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;

use super::error_response;

#[derive(Deserialize)]
pub struct AuthorListQuery {
    firstname: Option<String>,
    lastname: Option<String>,
    q: Option<String>,
    sort: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

pub async fn list_authors(
    State(state): State<AppState>,
    _claims: Claims,
    Query(params): Query<AuthorListQuery>,
) -> impl IntoResponse {
    let filter = AuthorFilter {
        firstname: params.firstname,
        lastname: params.lastname,
        query: params.q,
        sort: params.sort,
        page: params.page,
        limit: params.limit,
    };

    match state.author_repo.find_all(filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "authors": page.authors, "total": page.total })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct AuthorRequest {
    firstname: String,
    lastname: String,
}

pub async fn create_author(
    State(state): State<AppState>,
    _claims: Claims,
    Json(payload): Json<AuthorRequest>,
) -> impl IntoResponse {
    match state
        .author_repo
        .create(payload.firstname, payload.lastname)
        .await
    {
        Ok(author) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Success!", "author": author })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn get_author(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.author_repo.find_by_id(id).await {
        Ok(Some(author)) => (StatusCode::OK, Json(author)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Author not found" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_author(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<AuthorRequest>,
) -> impl IntoResponse {
    match state
        .author_repo
        .update(id, payload.firstname, payload.lastname)
        .await
    {
        Ok(author) => (
            StatusCode::OK,
            Json(json!({ "message": "Success!", "author": author })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

// Deleting an author removes the author's books as well.
pub async fn delete_author(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.author_repo.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Deleted successfully!" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
