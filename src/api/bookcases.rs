use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::BookcaseFilter;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;

use super::error_response;

#[derive(Deserialize)]
pub struct BookcaseListQuery {
    name: Option<String>,
    sort: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/bookcases",
    responses(
        (status = 200, description = "The owner's bookcases, each annotated with its slot count")
    )
)]
pub async fn list_bookcases(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<BookcaseListQuery>,
) -> impl IntoResponse {
    let filter = BookcaseFilter {
        name: params.name,
        sort: params.sort,
        page: params.page,
        limit: params.limit,
    };

    match state.bookcase_repo.find_all(claims.uid, filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "bookcases": page.bookcases, "total": page.total })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct CreateBookcaseRequest {
    name: String,
    shelf_count: i32,
    shelf_capacity: i32,
}

#[utoipa::path(
    post,
    path = "/api/bookcases",
    responses(
        (status = 201, description = "Bookcase created with its full slot grid"),
        (status = 400, description = "Shelf count or capacity out of range"),
        (status = 409, description = "The owner already has a bookcase with this name")
    )
)]
pub async fn create_bookcase(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateBookcaseRequest>,
) -> impl IntoResponse {
    match state
        .bookcase_repo
        .create_with_slots(
            claims.uid,
            payload.name,
            payload.shelf_count,
            payload.shelf_capacity,
        )
        .await
    {
        Ok(case) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Success!", "bookcase": case })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn get_bookcase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.bookcase_repo.find_by_id(claims.uid, id).await {
        Ok(Some(case)) => (StatusCode::OK, Json(case)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Bookcase not found" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct UpdateBookcaseRequest {
    name: String,
}

// Only the name is editable; the slot grid is fixed at creation time.
pub async fn update_bookcase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookcaseRequest>,
) -> impl IntoResponse {
    match state
        .bookcase_repo
        .rename(claims.uid, id, payload.name)
        .await
    {
        Ok(case) => (
            StatusCode::OK,
            Json(json!({ "message": "Success!", "bookcase": case })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_bookcase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.bookcase_repo.delete(claims.uid, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Deleted successfully!" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
