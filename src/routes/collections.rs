use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::AppState;
use crate::controllers::collections;
use crate::error::Result;
use crate::models::{CollectionView, FlashcardSetView, Preview, Success, TitleRequest};
use crate::routes::extract::JsonBody;
use crate::routes::updated;
use crate::session::Identity;

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Preview>>> {
    let store = state.store.clone();
    let previews =
        tokio::task::spawn_blocking(move || collections::list_all(&store, &identity.user_id))
            .await??;

    Ok(Json(previews))
}

/// POST /api/collections
pub async fn create_collection(
    State(state): State<AppState>,
    identity: Identity,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Json<Preview>> {
    let store = state.store.clone();
    let preview = tokio::task::spawn_blocking(move || {
        collections::create(&store, &identity.user_id, payload)
    })
    .await??;

    Ok(Json(preview))
}

/// GET /api/collections/{col_id}
pub async fn get_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path(col_id): Path<String>,
) -> Result<Json<CollectionView>> {
    let store = state.store.clone();
    let view = tokio::task::spawn_blocking(move || {
        collections::get(&store, &identity.user_id, &col_id)
    })
    .await??;

    Ok(Json(view))
}

/// Every flashcard in the collection, sub-collections included, for printing
///
/// GET /api/collections/{col_id}/flashcards
pub async fn get_collection_flashcards(
    State(state): State<AppState>,
    identity: Identity,
    Path(col_id): Path<String>,
) -> Result<Json<FlashcardSetView>> {
    let store = state.store.clone();
    let view = tokio::task::spawn_blocking(move || {
        collections::get_all_flashcards(&store, &identity.user_id, &col_id)
    })
    .await??;

    Ok(Json(view))
}

/// PATCH /api/collections/{col_id}
pub async fn update_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path(col_id): Path<String>,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Response> {
    let store = state.store.clone();
    let update = tokio::task::spawn_blocking(move || {
        collections::update(&store, &identity.user_id, &col_id, payload)
    })
    .await??;

    Ok(updated(update, "Title"))
}

/// DELETE /api/collections/{col_id}
pub async fn delete_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path(col_id): Path<String>,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || collections::delete(&store, &identity.user_id, &col_id))
        .await??;

    Ok(Json(Success::new()))
}
