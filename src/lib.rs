//! Framery renders an animation as a sequence of per-frame images and streams
//! them, strictly in frame order, to an output sink.
//!
//! Rendering a frame is CPU-bound and independent of every other frame, so the
//! pipeline fans frames out to a fixed-size worker pool and then collates the
//! out-of-order completions back into a single ordered stream:
//!
//! - Compose per-frame work from [`RenderStep`] values (`then` / `within` / `of`)
//! - Drive a [`ParallelEngine`] with one [`RenderContext`] per frame
//! - Receive frames in strictly increasing frame order through a [`FrameSink`]
//!   or any terminal [`RenderStep`]
//!
//! Frame identity within a clip is carried by [`TimecodeFragment`] (an
//! immutable `day / second / frame / rate` value with total ordering and
//! frame-accurate arithmetic) and [`Timecode`] (the mutable per-stream cursor).
//!
//! The engine guarantees the sink observes every admitted frame exactly once,
//! in increasing frame-number order, regardless of worker completion order,
//! and bounds the memory held by completed-but-unsunk frames to the worker
//! count. Encoders, drawing and scripting live outside this crate; the sink
//! trait is the boundary they plug into.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Worker-pool engine, ordering gate and frame sinks.
pub mod engine;
/// Per-frame render context and the render-step composition algebra.
pub mod render;
/// Timecode fragments, the stream cursor and bounded timecode iterators.
pub mod timecode;

pub use crate::foundation::core::FrameImage;
pub use crate::foundation::error::{FrameryError, FrameryResult};

pub use crate::engine::parallel::{EngineConfig, ParallelEngine};
pub use crate::engine::sink::{FrameSink, InMemorySink, SinkConfig, sink_step};
pub use crate::render::context::{RenderContext, ScratchValue};
pub use crate::render::step::RenderStep;
pub use crate::timecode::cursor::{Timecode, TimecodeIter};
pub use crate::timecode::fragment::{SECONDS_PER_DAY, TimecodeFragment};
