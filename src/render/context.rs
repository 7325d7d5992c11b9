use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::FrameImage;
use crate::foundation::error::FrameryResult;

/// A value stored in a context's scratch space.
///
/// Scratch values are shared by reference across worker clones, so anything
/// placed here before parallel rendering starts must be treated as read-only
/// for the duration of the run (or carry its own synchronization).
pub type ScratchValue = Arc<dyn Any + Send + Sync>;

/// The mutable per-frame unit of work.
///
/// A context owns the image buffer a frame is drawn into, carries the frame
/// number the engine orders by, and exposes an arbitrary key-value scratch
/// space for state passed between render steps within a frame.
///
/// The driver owns the canonical context; the engine never mutates it.
/// Each submission hands a [`clone_for_worker`](Self::clone_for_worker) copy
/// to exactly one worker, which owns it until the sink consumes it.
#[derive(Debug)]
pub struct RenderContext {
    frame: u64,
    image: FrameImage,
    scratch: HashMap<String, ScratchValue>,
    last_frame: bool,
}

impl RenderContext {
    /// Create a context for `frame` with a transparent image buffer.
    pub fn new(frame: u64, width: u32, height: u32) -> FrameryResult<Self> {
        Ok(Self {
            frame,
            image: FrameImage::new(width, height)?,
            scratch: HashMap::new(),
            last_frame: false,
        })
    }

    /// Frame number of this context; the engine's sort key.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Set the frame number; drivers reuse one canonical context across
    /// sequential frames.
    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the frame's image.
    pub fn image(&self) -> &FrameImage {
        &self.image
    }

    /// Mutably borrow the frame's image.
    pub fn image_mut(&mut self) -> &mut FrameImage {
        &mut self.image
    }

    /// Replace the frame's image.
    pub fn set_image(&mut self, image: FrameImage) {
        self.image = image;
    }

    /// True when this is the last frame of the clip.
    ///
    /// This flag is the engine's sole end-of-stream signal; the driver must
    /// set it on the final submission.
    pub fn is_last_frame(&self) -> bool {
        self.last_frame
    }

    /// Flag this context as the last frame of the clip.
    pub fn set_last_frame(&mut self, last: bool) {
        self.last_frame = last;
    }

    /// Store a scratch value under `key`.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.scratch.insert(key.into(), Arc::new(value));
    }

    /// Look up a scratch value.
    pub fn get(&self, key: &str) -> Option<&ScratchValue> {
        self.scratch.get(key)
    }

    /// Look up a scratch value and downcast it to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.scratch.get(key).and_then(|v| v.downcast_ref())
    }

    /// Remove a scratch value, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<ScratchValue> {
        self.scratch.remove(key)
    }

    /// Drop all scratch values; drivers call this between frames.
    pub fn clear_scratch(&mut self) {
        self.scratch.clear();
    }

    /// Clone this context for a worker: the image buffer is deep-copied so no
    /// two workers ever alias the same pixels, while scratch entries are
    /// cloned shallowly (see [`ScratchValue`]).
    pub fn clone_for_worker(&self) -> Self {
        Self {
            frame: self.frame,
            image: self.image.clone(),
            scratch: self.scratch.clone(),
            last_frame: self.last_frame,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
