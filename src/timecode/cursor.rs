use crate::foundation::error::{FrameryError, FrameryResult};
use crate::timecode::fragment::TimecodeFragment;

// Frame numbers start at 1 as they index into output file names.
const START_FRAME_NUM: u64 = 1;

/// The mutable timecode cursor for one output stream.
///
/// Created at stream start and advanced exactly once per frame actually
/// written to the sink, never per frame scheduled. Alongside the current
/// [`TimecodeFragment`] it tracks an absolute emitted-frame number, starting
/// at 1, which is useful for file names and diagnostics but takes no part in
/// ordering.
#[derive(Clone, Debug)]
pub struct Timecode {
    frame_num: u64,
    start: TimecodeFragment,
    current: TimecodeFragment,
}

impl Timecode {
    /// Create a cursor at `00:00:00:00` with the given frame rate.
    pub fn new(frame_rate: u32) -> FrameryResult<Self> {
        let start = TimecodeFragment::new(frame_rate)?;
        Ok(Self {
            frame_num: START_FRAME_NUM,
            start,
            current: start,
        })
    }

    /// Frame rate of the clip.
    pub fn frame_rate(&self) -> u32 {
        self.start.frame_rate()
    }

    /// The emitted-frame number, starting at 1.
    pub fn frame_num(&self) -> u64 {
        self.frame_num
    }

    /// Timecode of the first frame.
    pub fn start(&self) -> TimecodeFragment {
        self.start
    }

    /// Timecode of the current frame.
    pub fn current(&self) -> TimecodeFragment {
        self.current
    }

    /// True once a frame has been emitted, i.e. [`advance`](Self::advance)
    /// has been called.
    pub fn is_running(&self) -> bool {
        self.frame_num > START_FRAME_NUM
    }

    /// Move the cursor one frame forward.
    pub fn advance(&mut self) {
        self.frame_num += 1;
        self.current = self.current.add_frames(1);
    }

    /// Set the starting timecode, in any form accepted by
    /// [`TimecodeFragment::parse`].
    ///
    /// Fails once the cursor is running.
    pub fn set(&mut self, s: &str) -> FrameryResult<()> {
        if self.is_running() {
            return Err(FrameryError::timecode("cannot set a running timecode"));
        }
        self.start = TimecodeFragment::parse(s, self.frame_rate())?;
        self.current = self.start;
        Ok(())
    }

    /// Iterate the cursor over the next `count` frames (inclusive of the
    /// frame `count` ahead of the current one).
    pub fn for_frames(&mut self, count: u64) -> TimecodeIter<'_> {
        let end = self.current.add_frames(count);
        TimecodeIter { tc: self, end }
    }

    /// Iterate the cursor up to and including the given timecode.
    ///
    /// A target behind the cursor is taken to be on the next day, so a clip
    /// can run across midnight.
    pub fn until(&mut self, s: &str) -> FrameryResult<TimecodeIter<'_>> {
        let mut end = TimecodeFragment::parse(s, self.frame_rate())?;
        if end < self.current {
            end = TimecodeFragment::from_parts(
                end.day() + 1,
                end.second_of_day(),
                end.frame(),
                end.frame_rate(),
            )?;
        }
        Ok(TimecodeIter { tc: self, end })
    }
}

/// Bounded iterator returned by [`Timecode::for_frames`] and
/// [`Timecode::until`]; each step yields the current fragment then advances
/// the cursor.
#[derive(Debug)]
pub struct TimecodeIter<'a> {
    tc: &'a mut Timecode,
    end: TimecodeFragment,
}

impl Iterator for TimecodeIter<'_> {
    type Item = TimecodeFragment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tc.current > self.end {
            return None;
        }
        let ret = self.tc.current;
        self.tc.advance();
        Some(ret)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timecode/cursor.rs"]
mod tests;
