//! Parsers for transcript payloads and transcript log directories
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach:
//!
//! - **Field-level failures**: Transcript fields with the wrong shape fall back to their
//!   defaults through the lenient deserializers, so one odd field never loses a pair.
//!
//! - **Pair-level failures**: Pairs that are not JSON objects are skipped. A payload where
//!   every pair fails is rejected, which makes the assembler drop that conversation.
//!
//! - **Line-level failures**: Malformed JSONL lines in a log file are logged and skipped. If
//!   >50% of lines fail, or 100 lines in a row fail, the whole file is rejected.
//!
//! - **Source failures**: A transcript directory that is missing or unreadable is an error
//!   and propagates to the caller as a build failure.

pub mod conversation;
pub mod deserializers;
pub mod source;

pub use conversation::{parse_pair_file, parse_transcript};
pub use source::{ConversationSource, TraceDirectory};
