use serde::{Deserialize, Serialize};

use crate::constants::{ERR_TITLE_LENGTH, MAX_TITLE_LENGTH};
use crate::error::{AppError, Result};
use crate::models::user::required;

/// Metadata of collections, sub-collections and flashcards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetadata {
    pub title: String,
}

/// Body of every create / rename request
#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: Option<String>,
}

impl TitleRequest {
    /// Extract a title of 1..=60 characters, reporting `missing` when absent
    pub fn into_title(self, missing: &str) -> Result<String> {
        let title = required(self.title, missing)?;
        validate_title(&title)?;
        Ok(title)
    }
}

pub fn validate_title(title: &str) -> Result<()> {
    let length = title.chars().count();
    if length == 0 || length > MAX_TITLE_LENGTH {
        return Err(AppError::invalid(ERR_TITLE_LENGTH));
    }
    Ok(())
}

/// `{id, title}` projection used in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub id: String,
    pub title: String,
}

/// A collection with its direct children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    pub id: String,
    pub title: String,
    #[serde(rename = "subCollectionData")]
    pub sub_collection_data: Vec<Preview>,
    #[serde(rename = "flashcardData")]
    pub flashcard_data: Vec<Preview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCollectionView {
    pub id: String,
    pub title: String,
    #[serde(rename = "flashcardData")]
    pub flashcard_data: Vec<Preview>,
}

/// Every flashcard of a collection, nested ones included (print view)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashcardSetView {
    pub id: String,
    pub title: String,
    #[serde(rename = "flashcardData")]
    pub flashcard_data: Vec<Preview>,
}
