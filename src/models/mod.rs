//! Data models for transcript search.
//!
//! - [`TranscriptPair`] and friends - the request/response transcript representation
//!   consumed by the indexer
//! - [`RawConversation`] - an unparsed conversation record handed to the assembler
//! - [`SearchIndex`] - the immutable index document with its per-conversation entries,
//!   inverted index and corpus metadata
//! - [`SearchResult`] - one ranked query hit
//!
//! Transcript fields use lenient serde deserializers from the `deserializers` module so
//! that malformed fields degrade to defaults.

pub mod index;
pub mod search;
pub mod transcript;

pub use index::{
    ConversationIndexEntry, DateRange, INDEX_VERSION, InvertedIndex, Posting, SearchIndex,
    SearchMetadata, TokenUsage, ToolCall,
};
pub use search::SearchResult;
pub use transcript::{
    ContentBlock, ConversationSummary, MessageContent, RawConversation, RequestMessage,
    SystemBlock, SystemPrompt, TranscriptPair, TranscriptRequest, TranscriptResponse,
    UNKNOWN_ERROR, Usage,
};
