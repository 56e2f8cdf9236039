//! Flashcards are leaves. Which parent a card belongs to is fixed by the key
//! it was created under, so every operation takes the same [`CardParent`] the
//! request path names.

use crate::constants::{ERR_EXPECTED_LAYERS, MAX_LAYERS_SIZE_BYTES, WARN_LAYERS_SIZE_BYTES};
use crate::controllers::{collections, require_id, subcollections};
use crate::error::{AppError, Result};
use crate::keys::{self, CardParent};
use crate::models::flashcard::validate_layers;
use crate::models::{NewFlashcard, Preview, TitleMetadata, TitleRequest, Update};
use crate::security::random_id;
use crate::store::{Entry, PutOptions, Store};

const ERR_NOT_FOUND: &str = "Flashcard does not exist";
const ERR_MISSING_TITLE: &str = "Missing flashcard title";

/// Serialized layer list of a new card
const EMPTY_LAYERS: &str = "[]";

fn existing(store: &Store, card_key: &str) -> Result<(String, TitleMetadata)> {
    match store.flashcards.get_with_metadata(card_key)? {
        Some(Entry {
            value,
            metadata: Some(metadata),
        }) => Ok((value, metadata)),
        _ => Err(AppError::not_found(ERR_NOT_FOUND)),
    }
}

/// Reject a card address built from malformed path ids as an unknown card
fn require_card_ids(parent: CardParent<'_>, card_id: &str) -> Result<()> {
    if !parent.has_valid_ids() {
        return Err(AppError::not_found(ERR_NOT_FOUND));
    }
    require_id(card_id, ERR_NOT_FOUND)
}

pub fn create(
    store: &Store,
    user_id: &str,
    parent: CardParent<'_>,
    request: TitleRequest,
) -> Result<NewFlashcard> {
    let title = request.into_title(ERR_MISSING_TITLE)?;

    let parent_missing = match parent {
        CardParent::Collection { .. } => collections::ERR_NOT_FOUND,
        CardParent::SubCollection { .. } => subcollections::ERR_NOT_FOUND,
    };
    if !parent.has_valid_ids() {
        return Err(AppError::not_found(parent_missing));
    }

    let parent_key = parent.key(user_id);
    match parent {
        CardParent::Collection { .. } => collections::existing_title(store, &parent_key)?,
        CardParent::SubCollection { .. } => subcollections::existing_title(store, &parent_key)?,
    };

    let id = random_id();
    store.flashcards.put(
        &keys::flashcard_key(user_id, parent, &id),
        EMPTY_LAYERS,
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    tracing::info!("Flashcard {} created", id);

    Ok(NewFlashcard {
        id,
        title,
        layers: Vec::new(),
    })
}

pub fn get_preview(
    store: &Store,
    user_id: &str,
    parent: CardParent<'_>,
    card_id: &str,
) -> Result<Preview> {
    require_card_ids(parent, card_id)?;
    let (_, metadata) = existing(store, &keys::flashcard_key(user_id, parent, card_id))?;

    Ok(Preview {
        id: card_id.to_string(),
        title: metadata.title,
    })
}

/// The stored layer list, exactly as it was last written
pub fn get_layers(
    store: &Store,
    user_id: &str,
    parent: CardParent<'_>,
    card_id: &str,
) -> Result<String> {
    require_card_ids(parent, card_id)?;
    store
        .flashcards
        .get(&keys::flashcard_key(user_id, parent, card_id))?
        .ok_or_else(|| AppError::not_found(ERR_NOT_FOUND))
}

/// Retitle a card, keeping its layers
pub fn update_title(
    store: &Store,
    user_id: &str,
    parent: CardParent<'_>,
    card_id: &str,
    request: TitleRequest,
) -> Result<Update<Preview>> {
    let title = request.into_title(ERR_MISSING_TITLE)?;
    require_card_ids(parent, card_id)?;
    let card_key = keys::flashcard_key(user_id, parent, card_id);

    let (layers, metadata) = existing(store, &card_key)?;
    if metadata.title == title {
        return Ok(Update::Unchanged);
    }

    store.flashcards.put(
        &card_key,
        &layers,
        PutOptions::with_metadata(TitleMetadata {
            title: title.clone(),
        }),
    )?;

    Ok(Update::Changed(Preview {
        id: card_id.to_string(),
        title,
    }))
}

/// Replace a card's layers, keeping its metadata.
///
/// The payload is checked to be a well-formed layer list and then stored
/// byte for byte.
pub fn update_layers(
    store: &Store,
    user_id: &str,
    parent: CardParent<'_>,
    card_id: &str,
    raw: &str,
) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(AppError::invalid(ERR_EXPECTED_LAYERS));
    }
    if raw.len() > MAX_LAYERS_SIZE_BYTES {
        tracing::warn!(
            "Layer payload too large for flashcard {}: {} bytes (max: {})",
            card_id,
            raw.len(),
            MAX_LAYERS_SIZE_BYTES
        );
        return Err(AppError::PayloadTooLarge);
    }
    if raw.len() > WARN_LAYERS_SIZE_BYTES {
        tracing::info!("Large layer payload for flashcard {}: {} bytes", card_id, raw.len());
    }

    let layers = validate_layers(raw)?;

    require_card_ids(parent, card_id)?;
    let card_key = keys::flashcard_key(user_id, parent, card_id);
    let (_, metadata) = existing(store, &card_key)?;

    store
        .flashcards
        .put(&card_key, raw, PutOptions::with_metadata(metadata))?;

    tracing::debug!("Flashcard {} saved with {} layers", card_id, layers.len());

    Ok(())
}

/// Delete a card; there is nothing below it
pub fn delete(store: &Store, user_id: &str, parent: CardParent<'_>, card_id: &str) -> Result<()> {
    require_card_ids(parent, card_id)?;
    store
        .flashcards
        .delete(&keys::flashcard_key(user_id, parent, card_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER: &str = "0123456789abcdef0123456789abcdef";

    fn titled(title: &str) -> TitleRequest {
        TitleRequest {
            title: Some(title.to_string()),
        }
    }

    fn setup(store: &Store) -> (String, String) {
        let col_id = collections::create(store, USER, titled("Spanish")).unwrap().id;
        let sub_id = subcollections::create(store, USER, &col_id, titled("Verbs"))
            .unwrap()
            .id;
        (col_id, sub_id)
    }

    #[test]
    fn test_create_starts_with_empty_layers() {
        let store = Store::in_memory();
        let (col_id, _) = setup(&store);
        let parent = CardParent::Collection { col_id: &col_id };

        let card = create(&store, USER, parent, titled("Card 1")).unwrap();
        assert!(card.layers.is_empty());
        assert_eq!(get_layers(&store, USER, parent, &card.id).unwrap(), "[]");
        assert_eq!(
            get_preview(&store, USER, parent, &card.id).unwrap().title,
            "Card 1"
        );
    }

    #[test]
    fn test_create_requires_existing_parent() {
        let store = Store::in_memory();
        let (col_id, _) = setup(&store);

        let missing_sub = CardParent::SubCollection {
            col_id: &col_id,
            sub_id: "nope",
        };
        let err = create(&store, USER, missing_sub, titled("Card")).unwrap_err();
        assert!(
            matches!(err, AppError::NotFound(ref msg) if msg == "Sub-collection does not exist")
        );

        let missing_col = CardParent::Collection { col_id: "nope" };
        assert!(create(&store, USER, missing_col, titled("Card")).is_err());
    }

    #[test]
    fn test_parent_is_part_of_the_address() {
        let store = Store::in_memory();
        let (col_id, sub_id) = setup(&store);
        let nested = CardParent::SubCollection {
            col_id: &col_id,
            sub_id: &sub_id,
        };

        let card = create(&store, USER, nested, titled("Ser")).unwrap();

        assert!(get_preview(&store, USER, nested, &card.id).is_ok());
        assert!(matches!(
            get_preview(&store, USER, CardParent::Collection { col_id: &col_id }, &card.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_layers_round_trip_verbatim() {
        let store = Store::in_memory();
        let (col_id, _) = setup(&store);
        let parent = CardParent::Collection { col_id: &col_id };
        let card = create(&store, USER, parent, titled("Card 1")).unwrap();

        // Formatting is preserved exactly, not re-serialized
        let raw = format!(
            "[ {},\n  {} ]",
            json!({"id": 0, "contents": [], "drawContents": ""}),
            json!({"id": 1, "contents": [{"id": 0, "type": "text", "left": 1.5, "top": 2,
                   "width": 3, "height": 4, "contents": {"ops": []}}], "drawContents": "AAAA"})
        );
        update_layers(&store, USER, parent, &card.id, &raw).unwrap();

        assert_eq!(get_layers(&store, USER, parent, &card.id).unwrap(), raw);
        assert_eq!(
            get_preview(&store, USER, parent, &card.id).unwrap().title,
            "Card 1"
        );
    }

    #[test]
    fn test_update_layers_rejections() {
        let store = Store::in_memory();
        let (col_id, _) = setup(&store);
        let parent = CardParent::Collection { col_id: &col_id };
        let card = create(&store, USER, parent, titled("Card 1")).unwrap();

        let err = update_layers(&store, USER, parent, &card.id, "").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == ERR_EXPECTED_LAYERS));

        assert!(matches!(
            update_layers(&store, USER, parent, &card.id, r#"[{"id": 1}]"#),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            update_layers(&store, USER, parent, "nope", "[]"),
            Err(AppError::NotFound(_))
        ));

        let oversized = " ".repeat(MAX_LAYERS_SIZE_BYTES) + "[]";
        assert!(matches!(
            update_layers(&store, USER, parent, &card.id, &oversized),
            Err(AppError::PayloadTooLarge)
        ));

        assert_eq!(get_layers(&store, USER, parent, &card.id).unwrap(), "[]");
    }

    #[test]
    fn test_update_title_keeps_layers() {
        let store = Store::in_memory();
        let (col_id, sub_id) = setup(&store);
        let parent = CardParent::SubCollection {
            col_id: &col_id,
            sub_id: &sub_id,
        };
        let card = create(&store, USER, parent, titled("Card 1")).unwrap();
        let raw = r#"[{"id":0,"contents":[],"drawContents":""}]"#;
        update_layers(&store, USER, parent, &card.id, raw).unwrap();

        assert_eq!(
            update_title(&store, USER, parent, &card.id, titled("Card 1")).unwrap(),
            Update::Unchanged
        );
        assert!(matches!(
            update_title(&store, USER, parent, &card.id, titled("Card A")).unwrap(),
            Update::Changed(_)
        ));

        assert_eq!(get_layers(&store, USER, parent, &card.id).unwrap(), raw);
        assert_eq!(
            get_preview(&store, USER, parent, &card.id).unwrap().title,
            "Card A"
        );
    }

    #[test]
    fn test_delete() {
        let store = Store::in_memory();
        let (col_id, _) = setup(&store);
        let parent = CardParent::Collection { col_id: &col_id };
        let card = create(&store, USER, parent, titled("Card 1")).unwrap();

        delete(&store, USER, parent, &card.id).unwrap();
        assert!(matches!(
            get_layers(&store, USER, parent, &card.id),
            Err(AppError::NotFound(_))
        ));
        // Deleting again is harmless
        delete(&store, USER, parent, &card.id).unwrap();
    }

    #[test]
    fn test_malformed_ids_are_unknown_cards() {
        let store = Store::in_memory();
        let (col_id, sub_id) = setup(&store);
        let direct = CardParent::Collection { col_id: &col_id };
        let card = create(&store, USER, direct, titled("Card 1")).unwrap();

        // The direct card addressed through a crafted sub-collection id
        let crafted_sub = format!("{}:card", sub_id);
        let crafted = CardParent::SubCollection {
            col_id: &col_id,
            sub_id: &crafted_sub,
        };
        let err = get_preview(&store, USER, crafted, &card.id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == ERR_NOT_FOUND));

        let err = create(&store, USER, crafted, titled("Card")).unwrap_err();
        assert!(
            matches!(err, AppError::NotFound(ref msg) if msg == subcollections::ERR_NOT_FOUND)
        );

        let crafted_card = format!("{}:x", card.id);
        assert!(get_layers(&store, USER, direct, &crafted_card).is_err());
        assert!(update_layers(&store, USER, direct, &crafted_card, "[]").is_err());
        assert!(delete(&store, USER, direct, &crafted_card).is_err());

        assert_eq!(get_layers(&store, USER, direct, &card.id).unwrap(), "[]");
    }
}

