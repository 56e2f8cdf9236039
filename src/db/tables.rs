use redb::TableDefinition;

/// Users table: "<username>:<userId>" -> record with {id, password} metadata
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Sessions table: session token -> record whose value is "<username>:<userId>"
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Collections table: "user:<userId>:col:<colId>" -> record with {title} metadata
pub const COLLECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Sub-collections table: "<collectionKey>:sub:<subId>" -> record with {title} metadata
pub const SUB_COLLECTIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("sub_collections");

/// Flashcards table: "<parentKey>:card:<cardId>" -> record holding the layer JSON
pub const FLASHCARDS: TableDefinition<&str, &[u8]> = TableDefinition::new("flashcards");

/// Every namespace table, in creation order
pub const ALL: [TableDefinition<&str, &[u8]>; 5] =
    [USERS, SESSIONS, COLLECTIONS, SUB_COLLECTIONS, FLASHCARDS];
