use crate::foundation::error::{FrameryError, FrameryResult};

/// A frame's pixel storage as straight RGBA8 bytes, tightly packed, row-major.
///
/// While a frame is in flight through the engine its image is exclusively
/// owned by the [`RenderContext`](crate::RenderContext) carrying it; cloning a
/// context deep-copies this buffer so no two workers ever alias the same
/// pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameImage {
    /// Create a transparent image of the given dimensions.
    pub fn new(width: u32, height: u32) -> FrameryResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameryError::validation(
                "frame image width/height must be non-zero",
            ));
        }
        let len = (width as usize) * (height as usize) * 4;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrow the RGBA8 bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Fill every pixel with one RGBA8 color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}
