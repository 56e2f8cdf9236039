//! Flashcard handlers.
//!
//! Every handler is mounted twice, under `/collections/{col_id}/flashcards`
//! and under `/collections/{col_id}/subcollections/{sub_col_id}/flashcards`.
//! The presence of `sub_col_id` in the path selects the parent.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::AppState;
use crate::controllers::flashcards;
use crate::error::Result;
use crate::keys::CardParent;
use crate::models::{NewFlashcard, Preview, Success, TitleRequest};
use crate::routes::extract::{JsonBody, RawBody};
use crate::routes::updated;
use crate::session::Identity;

fn card_parent<'a>(col_id: &'a str, sub_col_id: Option<&'a str>) -> CardParent<'a> {
    match sub_col_id {
        Some(sub_id) => CardParent::SubCollection { col_id, sub_id },
        None => CardParent::Collection { col_id },
    }
}

#[derive(Debug, Deserialize)]
pub struct ParentPath {
    pub col_id: String,
    pub sub_col_id: Option<String>,
}

impl ParentPath {
    fn parent(&self) -> CardParent<'_> {
        card_parent(&self.col_id, self.sub_col_id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CardPath {
    pub col_id: String,
    pub sub_col_id: Option<String>,
    pub card_id: String,
}

impl CardPath {
    fn parent(&self) -> CardParent<'_> {
        card_parent(&self.col_id, self.sub_col_id.as_deref())
    }
}

/// POST .../flashcards
pub async fn create_flashcard(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<ParentPath>,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Json<NewFlashcard>> {
    let store = state.store.clone();
    let card = tokio::task::spawn_blocking(move || {
        flashcards::create(&store, &identity.user_id, path.parent(), payload)
    })
    .await??;

    Ok(Json(card))
}

/// GET .../flashcards/{card_id}/preview
pub async fn get_flashcard_preview(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<CardPath>,
) -> Result<Json<Preview>> {
    let store = state.store.clone();
    let preview = tokio::task::spawn_blocking(move || {
        flashcards::get_preview(
            &store,
            &identity.user_id,
            path.parent(),
            &path.card_id,
        )
    })
    .await??;

    Ok(Json(preview))
}

/// The stored layer JSON, returned without re-encoding
///
/// GET .../flashcards/{card_id}/layers
pub async fn get_flashcard_layers(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<CardPath>,
) -> Result<Response> {
    let store = state.store.clone();
    let layers = tokio::task::spawn_blocking(move || {
        flashcards::get_layers(
            &store,
            &identity.user_id,
            path.parent(),
            &path.card_id,
        )
    })
    .await??;

    Ok(([(header::CONTENT_TYPE, "application/json")], layers).into_response())
}

/// PATCH .../flashcards/{card_id}/title
pub async fn update_flashcard_title(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<CardPath>,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> Result<Response> {
    let store = state.store.clone();
    let update = tokio::task::spawn_blocking(move || {
        flashcards::update_title(
            &store,
            &identity.user_id,
            path.parent(),
            &path.card_id,
            payload,
        )
    })
    .await??;

    Ok(updated(update, "Title"))
}

/// PATCH .../flashcards/{card_id}/layers
pub async fn update_flashcard_layers(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<CardPath>,
    RawBody(layers): RawBody,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || {
        flashcards::update_layers(
            &store,
            &identity.user_id,
            path.parent(),
            &path.card_id,
            &layers,
        )
    })
    .await??;

    Ok(Json(Success::new()))
}

/// DELETE .../flashcards/{card_id}
pub async fn delete_flashcard(
    State(state): State<AppState>,
    identity: Identity,
    Path(path): Path<CardPath>,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || {
        flashcards::delete(
            &store,
            &identity.user_id,
            path.parent(),
            &path.card_id,
        )
    })
    .await??;

    Ok(Json(Success::new()))
}
