//! Composite key construction.
//!
//! Keys are colon-delimited ownership chains. Every segment that is not a
//! fixed marker is either a generated hex id or a validated username, so no
//! segment ever contains `:` and the chain can be split back apart. Ids that
//! arrive in a request path must pass [`is_id`] before they reach a key.
//!
//! ```text
//! user:<userId>
//! user:<userId>:col:<colId>
//! user:<userId>:col:<colId>:sub:<subId>
//! user:<userId>:col:<colId>:card:<cardId>
//! user:<userId>:col:<colId>:sub:<subId>:card:<cardId>
//! ```

pub const SEPARATOR: char = ':';

const USER_MARKER: &str = "user";
const COLLECTION_MARKER: &str = "col";
const SUB_COLLECTION_MARKER: &str = "sub";
const FLASHCARD_MARKER: &str = "card";

/// Length of every generated id and session token
pub const ID_LEN: usize = 32;

/// Segment count of a flashcard stored directly under a collection
pub const DIRECT_FLASHCARD_SEGMENTS: usize = 6;

/// Segment count of a flashcard stored under a sub-collection
pub const NESTED_FLASHCARD_SEGMENTS: usize = 8;

/// Where a flashcard lives: directly in a collection or in one of its
/// sub-collections. Decided by the request path, never by the card itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardParent<'a> {
    Collection { col_id: &'a str },
    SubCollection { col_id: &'a str, sub_id: &'a str },
}

impl CardParent<'_> {
    pub fn key(&self, user_id: &str) -> String {
        match *self {
            CardParent::Collection { col_id } => collection_key(user_id, col_id),
            CardParent::SubCollection { col_id, sub_id } => {
                sub_collection_key(user_id, col_id, sub_id)
            }
        }
    }

    /// Whether every id naming this parent is a well-formed id
    pub fn has_valid_ids(&self) -> bool {
        match *self {
            CardParent::Collection { col_id } => is_id(col_id),
            CardParent::SubCollection { col_id, sub_id } => is_id(col_id) && is_id(sub_id),
        }
    }
}

/// Whether `segment` has the shape of a generated id: 32 lowercase hex digits
pub fn is_id(segment: &str) -> bool {
    segment.len() == ID_LEN && segment.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Key in the Users namespace
pub fn user_record_key(username: &str, user_id: &str) -> String {
    format!("{username}{SEPARATOR}{user_id}")
}

/// Prefix matching the Users entry of `username`, whatever its id
pub fn username_prefix(username: &str) -> String {
    format!("{username}{SEPARATOR}")
}

/// Root of everything a user owns in the other namespaces
pub fn user_key(user_id: &str) -> String {
    format!("{USER_MARKER}{SEPARATOR}{user_id}")
}

pub fn collection_key(user_id: &str, col_id: &str) -> String {
    format!(
        "{}{SEPARATOR}{COLLECTION_MARKER}{SEPARATOR}{col_id}",
        user_key(user_id)
    )
}

pub fn sub_collection_key(user_id: &str, col_id: &str, sub_id: &str) -> String {
    format!(
        "{}{SEPARATOR}{SUB_COLLECTION_MARKER}{SEPARATOR}{sub_id}",
        collection_key(user_id, col_id)
    )
}

pub fn flashcard_key(user_id: &str, parent: CardParent<'_>, card_id: &str) -> String {
    format!(
        "{}{SEPARATOR}{FLASHCARD_MARKER}{SEPARATOR}{card_id}",
        parent.key(user_id)
    )
}

/// Prefix under which every descendant of `key` is stored
pub fn children_prefix(key: &str) -> String {
    format!("{key}{SEPARATOR}")
}

/// Trailing id segment of a key
pub fn id_from_key(key: &str) -> &str {
    key.rsplit(SEPARATOR).next().unwrap_or(key)
}

/// Leading segment of a Users key
pub fn username_from_key(key: &str) -> &str {
    key.split(SEPARATOR).next().unwrap_or(key)
}

pub fn segment_count(key: &str) -> usize {
    key.split(SEPARATOR).count()
}

/// Id used for a flashcard in a collection's full listing.
///
/// Direct cards keep their plain id. Cards under a sub-collection get
/// `"<subId>:<cardId>"` so the caller can address them again.
pub fn listing_id_from_flashcard_key(key: &str) -> String {
    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    if segments.len() == NESTED_FLASHCARD_SEGMENTS {
        format!(
            "{}{SEPARATOR}{}",
            segments[NESTED_FLASHCARD_SEGMENTS - 3],
            segments[NESTED_FLASHCARD_SEGMENTS - 1]
        )
    } else {
        id_from_key(key).to_string()
    }
}
