//! Sub-collections sit exactly one level below a collection. They do not nest:
//! a sub-collection's children are flashcards only.

use crate::controllers::{
    CascadeReport, collections, previews, require_id, title_of, trailing_id,
};
use crate::error::{AppError, Result};
use crate::keys;
use crate::models::{Preview, SubCollectionView, TitleMetadata, TitleRequest, Update};
use crate::security::random_id;
use crate::store::{PutOptions, Store};

pub(crate) const ERR_NOT_FOUND: &str = "Sub-collection does not exist";
const ERR_MISSING_TITLE: &str = "Missing sub-collection title";

pub(crate) fn existing_title(store: &Store, sub_collection_key: &str) -> Result<String> {
    title_of(store.sub_collections.as_ref(), sub_collection_key)?
        .ok_or_else(|| AppError::not_found(ERR_NOT_FOUND))
}

fn require_ids(col_id: &str, sub_id: &str) -> Result<()> {
    require_id(col_id, ERR_NOT_FOUND)?;
    require_id(sub_id, ERR_NOT_FOUND)
}

pub fn create(
    store: &Store,
    user_id: &str,
    col_id: &str,
    request: TitleRequest,
) -> Result<Preview> {
    let title = request.into_title(ERR_MISSING_TITLE)?;
    require_id(col_id, collections::ERR_NOT_FOUND)?;
    collections::existing_title(store, &keys::collection_key(user_id, col_id))?;

    let id = random_id();
    store.sub_collections.put(
        &keys::sub_collection_key(user_id, col_id, &id),
        "",
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    tracing::info!("Sub-collection {} created in collection {}", id, col_id);

    Ok(Preview { id, title })
}

pub fn get(store: &Store, user_id: &str, col_id: &str, sub_id: &str) -> Result<SubCollectionView> {
    require_ids(col_id, sub_id)?;
    let sub_collection_key = keys::sub_collection_key(user_id, col_id, sub_id);
    let title = existing_title(store, &sub_collection_key)?;

    let listed = store
        .flashcards
        .list(&keys::children_prefix(&sub_collection_key))?;

    Ok(SubCollectionView {
        id: sub_id.to_string(),
        title,
        flashcard_data: previews(listed, trailing_id),
    })
}

pub fn update(
    store: &Store,
    user_id: &str,
    col_id: &str,
    sub_id: &str,
    request: TitleRequest,
) -> Result<Update<Preview>> {
    let title = request.into_title(ERR_MISSING_TITLE)?;
    require_ids(col_id, sub_id)?;
    let sub_collection_key = keys::sub_collection_key(user_id, col_id, sub_id);

    if existing_title(store, &sub_collection_key)? == title {
        return Ok(Update::Unchanged);
    }

    store.sub_collections.put(
        &sub_collection_key,
        "",
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    Ok(Update::Changed(Preview {
        id: sub_id.to_string(),
        title,
    }))
}

/// Delete a sub-collection and its flashcards
pub fn delete(store: &Store, user_id: &str, col_id: &str, sub_id: &str) -> Result<CascadeReport> {
    require_ids(col_id, sub_id)?;
    let sub_collection_key = keys::sub_collection_key(user_id, col_id, sub_id);
    store.sub_collections.delete(&sub_collection_key)?;

    let mut report = CascadeReport::parent();
    report.sweep(
        store.flashcards.as_ref(),
        &keys::children_prefix(&sub_collection_key),
    )?;

    tracing::info!(
        "Sub-collection {} deleted with {} flashcards",
        sub_id,
        report.deleted - 1
    );

    Ok(report)
}
