/// Question providers and their failure modes.
pub mod question_source;
/// Snapshot encoding shared by the persistent stores.
pub mod snapshot;
/// Storage abstraction layer for snapshot backends.
pub mod storage;
mod user_map;
/// Per-user game state stores.
pub mod user_store;
