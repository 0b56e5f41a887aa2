use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{BookFilter, BookInput, DomainError};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;

use super::error_response;

#[derive(Deserialize)]
pub struct BookListQuery {
    name: Option<String>,
    author_name: Option<String>,
    bookcase_name: Option<String>,
    bookshelf_number: Option<i32>,
    number: Option<i32>,
    sort: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "The owner's placed books with bookcase, shelf and slot columns")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<BookListQuery>,
) -> impl IntoResponse {
    let filter = BookFilter {
        name: params.name,
        author_name: params.author_name,
        bookcase_name: params.bookcase_name,
        bookshelf_number: params.bookshelf_number,
        number: params.number,
        sort: params.sort,
        page: params.page,
        limit: params.limit,
    };

    match state.book_repo.find_all(claims.uid, filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "books": page.books, "total": page.total })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Unknown author, or slot outside the owner's bookcases"),
        (status = 409, description = "The selected slot is already occupied")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<BookInput>,
) -> impl IntoResponse {
    match state.book_repo.create(claims.uid, payload).await {
        Ok(book) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Success!", "book": book })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn get_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.book_repo.find_by_id(claims.uid, id).await {
        Ok(Some(book)) => (StatusCode::OK, Json(book)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<BookInput>,
) -> impl IntoResponse {
    match state.book_repo.update(claims.uid, id, payload).await {
        Ok(book) => (
            StatusCode::OK,
            Json(json!({ "message": "Success!", "book": book })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.book_repo.delete(claims.uid, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Deleted successfully!" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Multipart upload for the book picture. The payload is sniffed, not
/// trusted: only PNG and JPEG bytes are written to the media
/// directory, under a generated filename.
pub async fn upload_picture(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    match state.book_repo.find_by_id(claims.uid, id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Book not found" })),
            )
                .into_response();
        }
        Err(e) => return error_response(e).into_response(),
    }

    let mut data: Option<axum::body::Bytes> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("picture") {
            data = field.bytes().await.ok();
            break;
        }
    }

    let Some(bytes) = data else {
        return error_response(DomainError::Validation(
            "picture: missing or unreadable picture field".to_string(),
        ))
        .into_response();
    };

    let extension = match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::Jpeg) => "jpg",
        _ => {
            return error_response(DomainError::Validation(
                "picture: must be a PNG or JPEG image".to_string(),
            ))
            .into_response();
        }
    };

    let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);
    let media_dir = std::path::PathBuf::from(&state.config.media_dir);

    if let Err(e) = tokio::fs::create_dir_all(&media_dir).await {
        return error_response(DomainError::Internal(e.to_string())).into_response();
    }
    if let Err(e) = tokio::fs::write(media_dir.join(&filename), &bytes).await {
        return error_response(DomainError::Internal(e.to_string())).into_response();
    }

    let path = format!("/media/{}", filename);
    match state.book_repo.set_picture(claims.uid, id, path).await {
        Ok(book) => (
            StatusCode::OK,
            Json(json!({ "message": "Success!", "book": book })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
