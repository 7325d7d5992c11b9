use std::sync::{Mutex, PoisonError};

use crate::foundation::core::FrameImage;
use crate::foundation::error::{FrameryError, FrameryResult};
use crate::render::step::RenderStep;

/// Configuration handed to a [`FrameSink`] at the start of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub frame_rate: u32,
}

/// Sink contract for consuming rendered frames.
///
/// Ordering contract: with collation enabled, [`commit_frame`](Self::commit_frame)
/// is called at most once per frame, in strictly increasing frame-number
/// order, with no gaps. Concrete encoders and muxers implement this trait
/// outside the crate.
pub trait FrameSink: Send {
    /// Called once before any frame is committed.
    fn begin(&mut self, cfg: SinkConfig) -> FrameryResult<()>;
    /// Commit one frame; may block while encoding or writing.
    fn commit_frame(&mut self, frame: u64, image: &FrameImage) -> FrameryResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> FrameryResult<()>;
}

/// In-memory sink for tests and debugging.
///
/// The handle clones cheaply and shares its captured frames, so a test can
/// keep one copy while the engine consumes the other.
#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    state: std::sync::Arc<Mutex<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameImage)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The configuration captured by `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.state().cfg
    }

    /// Copy out the committed frames in commit order.
    pub fn frames(&self) -> Vec<(u64, FrameImage)> {
        self.state().frames.clone()
    }

    /// The committed frame numbers in commit order.
    pub fn frame_numbers(&self) -> Vec<u64> {
        self.state().frames.iter().map(|(f, _)| *f).collect()
    }

    /// True once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.state().ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FrameryResult<()> {
        let mut state = self.state();
        state.cfg = Some(cfg);
        state.frames.clear();
        state.ended = false;
        Ok(())
    }

    fn commit_frame(&mut self, frame: u64, image: &FrameImage) -> FrameryResult<()> {
        self.state().frames.push((frame, image.clone()));
        Ok(())
    }

    fn end(&mut self) -> FrameryResult<()> {
        self.state().ended = true;
        Ok(())
    }
}

/// Adapt a [`FrameSink`] into the terminal [`RenderStep`] of a pipeline.
///
/// `begin` runs lazily before the first committed frame; `end` runs when a
/// context flagged as the last frame is committed. The adapter serializes
/// access internally, so it is safe as the sink of an uncollated engine too
/// (though only a collated engine guarantees frame order).
pub fn sink_step<S: FrameSink + 'static>(sink: S, cfg: SinkConfig) -> RenderStep {
    let state = Mutex::new((sink, false));
    RenderStep::new(move |ctx| {
        let mut guard = state
            .lock()
            .map_err(|_| FrameryError::sink("sink poisoned by an earlier panic"))?;
        let (sink, begun) = &mut *guard;
        if !*begun {
            sink.begin(cfg)?;
            *begun = true;
        }
        sink.commit_frame(ctx.frame(), ctx.image())?;
        if ctx.is_last_frame() {
            sink.end()?;
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/engine/sink.rs"]
mod tests;
