//! Entity operations over a [`Store`](crate::store::Store).
//!
//! Controllers are synchronous and transport-agnostic: they validate input
//! before touching the store, derive keys through [`crate::keys`], and return
//! typed results that the routes turn into HTTP responses. Ownership is never
//! checked explicitly; every key a controller builds starts with the caller's
//! own user id.

pub mod collections;
pub mod flashcards;
pub mod subcollections;
pub mod users;

use crate::error::{AppError, Result};
use crate::keys;
use crate::models::{Preview, TitleMetadata};
use crate::store::{Listed, Namespace};

/// Outcome of a best-effort cascade delete.
///
/// A cascade is a sequence of independent list and delete calls with no
/// rollback; the first failing call aborts it and leaves the rest in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Prefix listings performed
    pub listings: usize,
    /// Entries deleted, the parent itself included
    pub deleted: usize,
}

impl CascadeReport {
    /// Report for a parent whose own key has just been deleted
    fn parent() -> Self {
        Self {
            listings: 0,
            deleted: 1,
        }
    }

    /// List `prefix` in `namespace` and delete every entry found
    fn sweep<M>(&mut self, namespace: &dyn Namespace<M>, prefix: &str) -> Result<()> {
        let children = namespace.list(prefix)?;
        self.listings += 1;

        for child in &children {
            namespace.delete(&child.name)?;
            self.deleted += 1;
        }

        tracing::debug!("Cascade removed {} entries under {}", children.len(), prefix);
        Ok(())
    }
}

/// Title of the entry at `key`, or `None` when it does not exist.
///
/// An entry is never stored without a title, so a missing title means a
/// missing entry.
fn title_of(namespace: &dyn Namespace<TitleMetadata>, key: &str) -> Result<Option<String>> {
    Ok(namespace
        .get_with_metadata(key)?
        .and_then(|entry| entry.metadata)
        .map(|metadata| metadata.title))
}

/// Project listed entries to previews, deriving each id from the key
fn previews(
    listed: impl IntoIterator<Item = Listed<TitleMetadata>>,
    id_of: impl Fn(&str) -> String,
) -> Vec<Preview> {
    listed
        .into_iter()
        .filter_map(|entry| {
            let title = entry.metadata?.title;
            Some(Preview {
                id: id_of(&entry.name),
                title,
            })
        })
        .collect()
}

fn trailing_id(key: &str) -> String {
    keys::id_from_key(key).to_string()
}

/// An id from a request path that is not a generated id names nothing.
///
/// Checked before the id is placed in a key, so a crafted id can never reach
/// a different entry's key or prefix.
fn require_id(id: &str, not_found: &str) -> Result<()> {
    if keys::is_id(id) {
        return Ok(());
    }
    tracing::debug!("Rejected malformed id {:?}", id);
    Err(AppError::not_found(not_found))
}
