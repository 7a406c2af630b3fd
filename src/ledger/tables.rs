use redb::TableDefinition;

/// Likes: (photo_id, user_fingerprint) -> StoredLike (msgpack)
pub const LIKES: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("likes");

/// Counters: name -> value
pub const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

pub const NEXT_SEQUENCE: &str = "next_sequence";
