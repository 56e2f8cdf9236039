use crate::controllers::{CascadeReport, previews, require_id, title_of, trailing_id};
use crate::error::{AppError, Result};
use crate::keys;
use crate::models::{
    CollectionView, FlashcardSetView, Preview, TitleMetadata, TitleRequest, Update,
};
use crate::security::random_id;
use crate::store::{PutOptions, Store};

pub(crate) const ERR_NOT_FOUND: &str = "Collection does not exist";

/// Title of an existing collection, or 404
pub(crate) fn existing_title(store: &Store, collection_key: &str) -> Result<String> {
    title_of(store.collections.as_ref(), collection_key)?
        .ok_or_else(|| AppError::not_found(ERR_NOT_FOUND))
}

/// Every collection of the user, metadata only
pub fn list_all(store: &Store, user_id: &str) -> Result<Vec<Preview>> {
    let prefix = keys::children_prefix(&keys::user_key(user_id));
    Ok(previews(store.collections.list(&prefix)?, trailing_id))
}

pub fn create(store: &Store, user_id: &str, request: TitleRequest) -> Result<Preview> {
    let title = request.into_title("Missing collection title")?;
    let id = random_id();

    store.collections.put(
        &keys::collection_key(user_id, &id),
        "",
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    tracing::info!("Collection {} created", id);

    Ok(Preview { id, title })
}

/// A collection with its sub-collections and its direct flashcards.
///
/// Flashcards inside sub-collections share the collection's key prefix and
/// are told apart by their segment count.
pub fn get(store: &Store, user_id: &str, col_id: &str) -> Result<CollectionView> {
    require_id(col_id, ERR_NOT_FOUND)?;
    let collection_key = keys::collection_key(user_id, col_id);
    let title = existing_title(store, &collection_key)?;
    let prefix = keys::children_prefix(&collection_key);

    let sub_collection_data = previews(store.sub_collections.list(&prefix)?, trailing_id);

    let direct = store
        .flashcards
        .list(&prefix)?
        .into_iter()
        .filter(|listed| keys::segment_count(&listed.name) == keys::DIRECT_FLASHCARD_SEGMENTS);
    let flashcard_data = previews(direct, trailing_id);

    Ok(CollectionView {
        id: col_id.to_string(),
        title,
        sub_collection_data,
        flashcard_data,
    })
}

/// Every flashcard under a collection, nested ones tagged `"<subId>:<cardId>"`
pub fn get_all_flashcards(store: &Store, user_id: &str, col_id: &str) -> Result<FlashcardSetView> {
    require_id(col_id, ERR_NOT_FOUND)?;
    let collection_key = keys::collection_key(user_id, col_id);
    let title = existing_title(store, &collection_key)?;

    let listed = store
        .flashcards
        .list(&keys::children_prefix(&collection_key))?;

    Ok(FlashcardSetView {
        id: col_id.to_string(),
        title,
        flashcard_data: previews(listed, keys::listing_id_from_flashcard_key),
    })
}

/// Retitle a collection; its key never changes
pub fn update(
    store: &Store,
    user_id: &str,
    col_id: &str,
    request: TitleRequest,
) -> Result<Update<Preview>> {
    let title = request.into_title("Missing title")?;
    require_id(col_id, ERR_NOT_FOUND)?;
    let collection_key = keys::collection_key(user_id, col_id);

    if existing_title(store, &collection_key)? == title {
        return Ok(Update::Unchanged);
    }

    store.collections.put(
        &collection_key,
        "",
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    Ok(Update::Changed(Preview {
        id: col_id.to_string(),
        title,
    }))
}

/// Delete a collection, then its sub-collections and all its flashcards
pub fn delete(store: &Store, user_id: &str, col_id: &str) -> Result<CascadeReport> {
    require_id(col_id, ERR_NOT_FOUND)?;
    let collection_key = keys::collection_key(user_id, col_id);
    store.collections.delete(&collection_key)?;

    let prefix = keys::children_prefix(&collection_key);
    let mut report = CascadeReport::parent();
    report.sweep(store.sub_collections.as_ref(), &prefix)?;
    report.sweep(store.flashcards.as_ref(), &prefix)?;

    tracing::info!(
        "Collection {} deleted with {} children",
        col_id,
        report.deleted - 1
    );

    Ok(report)
}
