use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::AppState;
use crate::controllers::subcollections;
use crate::error::Result;
use crate::models::{Preview, SubCollectionView, Success, TitleRequest};
use crate::routes::extract::JsonBody;
use crate::routes::updated;
use crate::session::Identity;

/// POST /api/collections/{col_id}/subcollections
pub async fn create_sub_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path(col_id): Path<String>,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Json<Preview>> {
    let store = state.store.clone();
    let preview = tokio::task::spawn_blocking(move || {
        subcollections::create(&store, &identity.user_id, &col_id, payload)
    })
    .await??;

    Ok(Json(preview))
}

/// GET /api/collections/{col_id}/subcollections/{sub_col_id}
pub async fn get_sub_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path((col_id, sub_col_id)): Path<(String, String)>,
) -> Result<Json<SubCollectionView>> {
    let store = state.store.clone();
    let view = tokio::task::spawn_blocking(move || {
        subcollections::get(&store, &identity.user_id, &col_id, &sub_col_id)
    })
    .await??;

    Ok(Json(view))
}

/// PATCH /api/collections/{col_id}/subcollections/{sub_col_id}
pub async fn update_sub_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path((col_id, sub_col_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Response> {
    let store = state.store.clone();
    let update = tokio::task::spawn_blocking(move || {
        subcollections::update(&store, &identity.user_id, &col_id, &sub_col_id, payload)
    })
    .await??;

    Ok(updated(update, "Title"))
}

/// DELETE /api/collections/{col_id}/subcollections/{sub_col_id}
pub async fn delete_sub_collection(
    State(state): State<AppState>,
    identity: Identity,
    Path((col_id, sub_col_id)): Path<(String, String)>,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || {
        subcollections::delete(&store, &identity.user_id, &col_id, &sub_col_id)
    })
    .await??;

    Ok(Json(Success::new()))
}
