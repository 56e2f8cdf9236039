use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One drawable sheet of a flashcard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: i64,
    pub contents: Vec<Item>,
    /// Base64 raster of the freehand drawing overlay
    pub draw_contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Text,
    Image,
}

/// A positioned text box or image on a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Rich-text document for text items, base64 image for image items
    pub contents: serde_json::Value,
}

/// Response to flashcard creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFlashcard {
    pub id: String,
    pub title: String,
    pub layers: Vec<Layer>,
}

/// Check a serialized layer list before it is stored verbatim.
///
/// Layer ids must be unique within the card and item ids unique within
/// their layer.
pub fn validate_layers(raw: &str) -> Result<Vec<Layer>> {
    let layers: Vec<Layer> = serde_json::from_str(raw)
        .map_err(|e| AppError::invalid(format!("Invalid layer data: {e}")))?;

    let mut layer_ids = HashSet::new();
    for layer in &layers {
        if !layer_ids.insert(layer.id) {
            return Err(AppError::invalid(format!(
                "Duplicate layer id {}",
                layer.id
            )));
        }

        let mut item_ids = HashSet::new();
        for item in &layer.contents {
            if !item_ids.insert(item.id) {
                return Err(AppError::invalid(format!(
                    "Duplicate item id {} in layer {}",
                    item.id, layer.id
                )));
            }
        }
    }

    Ok(layers)
}
