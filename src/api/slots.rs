use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;

use super::error_response;

/// Slots of one owned bookcase, with occupancy annotation.
pub async fn list_bookcase_slots(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    // Resolve the bookcase first so a foreign id answers 404, not an
    // empty list.
    match state.bookcase_repo.find_by_id(claims.uid, id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Bookcase not found" })),
            )
                .into_response();
        }
        Err(e) => return error_response(e).into_response(),
    }

    match state.bookcase_repo.find_slots(claims.uid, Some(id)).await {
        Ok(slots) => (
            StatusCode::OK,
            Json(json!({ "slots": slots, "total": slots.len() })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct SlotListQuery {
    bookcase_id: Option<i32>,
}

/// The selection set the book form offers: every slot across the
/// owner's bookcases, occupied or not.
pub async fn list_slots(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<SlotListQuery>,
) -> impl IntoResponse {
    match state
        .bookcase_repo
        .find_slots(claims.uid, params.bookcase_id)
        .await
    {
        Ok(slots) => (
            StatusCode::OK,
            Json(json!({ "slots": slots, "total": slots.len() })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
