pub mod collection;
pub mod flashcard;
pub mod user;

pub use collection::{
    CollectionView, FlashcardSetView, Preview, SubCollectionView, TitleMetadata, TitleRequest,
};
pub use flashcard::{Item, ItemKind, Layer, NewFlashcard};
pub use user::{
    CredentialsRequest, SelfView, UpdatePasswordRequest, UpdateUserRequest, UserMetadata,
};

use serde::Serialize;

/// `{success: true}` body, optionally explaining a no-op
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Success {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Success {
    pub fn new() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn unchanged(what: &str) -> Self {
        Self {
            success: true,
            message: Some(format!("{what} unchanged")),
        }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an update that short-circuits when nothing changed
#[derive(Debug, Clone, PartialEq)]
pub enum Update<T> {
    Changed(T),
    Unchanged,
}
