//! The parallel frame-rendering engine.
//!
//! Work fans out to a fixed-size worker pool; completed frames funnel through
//! a bounded priority buffer keyed by frame number, and a single collator
//! hands them to the terminal render step strictly in frame order.

pub(crate) mod collate;
/// Worker pool engine and its configuration.
pub mod parallel;
/// Frame sink trait, in-memory sink and the terminal-step adapter.
pub mod sink;
