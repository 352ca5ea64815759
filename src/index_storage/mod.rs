//! Persistent index storage
//!
//! A built [`SearchIndex`](crate::models::SearchIndex) is written as one JSON document,
//! `search-index.json` inside a caller-chosen directory. Writes go through a temp file and
//! rename, so a reader never sees a half-written index.
//! Documents from another index version load as `None` and should be rebuilt.

pub mod persistence;

pub use persistence::{INDEX_FILENAME, index_path, load_index, save_index};
