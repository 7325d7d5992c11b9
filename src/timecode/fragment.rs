use std::cmp::Ordering;
use std::fmt;

use crate::foundation::error::{FrameryError, FrameryResult};

/// Seconds in one day; `sec` rolls over into `day` at this boundary.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// An immutable point in a clip: `day`, second-of-day, frame within that
/// second and the clip's frame rate.
///
/// Fragments order lexicographically on `(day, sec, frame)`, which equals
/// ordering by absolute frame count. The frame rate takes no part in equality
/// or ordering; it is fixed per clip and only drives the arithmetic.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimecodeFragment {
    day: u32,
    sec: u32,
    frame: u32,
    frame_rate: u32,
}

impl TimecodeFragment {
    /// The zero timecode (`00:00:00:00`) at the given frame rate.
    pub fn new(frame_rate: u32) -> FrameryResult<Self> {
        Self::from_parts(0, 0, 0, frame_rate)
    }

    /// Build a fragment from raw parts, bounds-checking each field.
    pub fn from_parts(day: u32, sec: u32, frame: u32, frame_rate: u32) -> FrameryResult<Self> {
        if frame_rate == 0 {
            return Err(FrameryError::timecode("frame rate must be > 0"));
        }
        if sec >= SECONDS_PER_DAY {
            return Err(FrameryError::timecode(format!(
                "second-of-day {sec} out of range"
            )));
        }
        if frame >= frame_rate {
            return Err(FrameryError::timecode(format!(
                "frame {frame} out of range for rate {frame_rate}"
            )));
        }
        Ok(Self {
            day,
            sec,
            frame,
            frame_rate,
        })
    }

    /// Parse `"hh:mm:ss"`, `"hh:mm:ss:ff"` or `"dd:hh:mm:ss:ff"`.
    ///
    /// The short form sets `ff` to 0; the five-field form carries a day for
    /// clips spanning midnight.
    pub fn parse(s: &str, frame_rate: u32) -> FrameryResult<Self> {
        if frame_rate == 0 {
            return Err(FrameryError::timecode("frame rate must be > 0"));
        }

        let invalid = || {
            FrameryError::timecode(format!(
                "invalid timecode {s:?}: must be hh:mm:ss, hh:mm:ss:ff or dd:hh:mm:ss:ff"
            ))
        };

        let mut fields: Vec<u32> = Vec::with_capacity(5);
        for part in s.split(':') {
            fields.push(part.parse().map_err(|_| invalid())?);
        }

        let day = match fields.len() {
            3 | 4 => 0,
            5 => fields.remove(0),
            _ => return Err(invalid()),
        };

        let (hour, minute, second) = (fields[0], fields[1], fields[2]);
        let frame = fields.get(3).copied().unwrap_or(0);
        if hour >= 24 || minute >= 60 || second >= 60 || frame >= frame_rate {
            return Err(invalid());
        }

        Self::from_parts(day, (hour * 60 + minute) * 60 + second, frame, frame_rate)
    }

    /// Day component, used when a clip spans midnight.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Hour component within the day.
    pub fn hour(&self) -> u32 {
        self.sec / 3600
    }

    /// Minute component within the hour.
    pub fn minute(&self) -> u32 {
        (self.sec / 60) % 60
    }

    /// Second component within the minute.
    pub fn second(&self) -> u32 {
        self.sec % 60
    }

    /// Second of the day in `[0, 86400)`.
    pub fn second_of_day(&self) -> u32 {
        self.sec
    }

    /// Frame within the current second, in `[0, frame_rate)`.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Frame rate of the clip.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Frames left in the current second, `frame_rate - frame`.
    pub fn frames_remaining(&self) -> u32 {
        self.frame_rate - self.frame
    }

    /// True when this fragment is the first frame of a whole second.
    pub fn is_second_start(&self) -> bool {
        self.frame == 0
    }

    /// Position as an absolute frame count from day 0, `00:00:00:00`.
    pub fn absolute_frame(&self) -> u64 {
        (u64::from(self.day) * u64::from(SECONDS_PER_DAY) + u64::from(self.sec))
            * u64::from(self.frame_rate)
            + u64::from(self.frame)
    }

    fn from_absolute(frames: u64, frame_rate: u32) -> Self {
        let secs = frames / u64::from(frame_rate);
        Self {
            day: (secs / u64::from(SECONDS_PER_DAY)) as u32,
            sec: (secs % u64::from(SECONDS_PER_DAY)) as u32,
            frame: (frames % u64::from(frame_rate)) as u32,
            frame_rate,
        }
    }

    /// Advance by a number of frames, cascading through seconds and days.
    pub fn add_frames(&self, count: u64) -> Self {
        Self::from_absolute(self.absolute_frame() + count, self.frame_rate)
    }

    /// Advance by days, hours, minutes, seconds and frames at once.
    pub fn add(&self, days: u32, hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        let secs = u64::from(days) * u64::from(SECONDS_PER_DAY)
            + u64::from(hours) * 3600
            + u64::from(minutes) * 60
            + u64::from(seconds);
        self.add_frames(secs * u64::from(self.frame_rate) + u64::from(frames))
    }
}

impl PartialEq for TimecodeFragment {
    fn eq(&self, other: &Self) -> bool {
        (self.day, self.sec, self.frame) == (other.day, other.sec, other.frame)
    }
}

impl Eq for TimecodeFragment {}

impl PartialOrd for TimecodeFragment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimecodeFragment {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.day, self.sec, self.frame).cmp(&(other.day, other.sec, other.frame))
    }
}

impl fmt::Display for TimecodeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second(),
            self.frame
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timecode/fragment.rs"]
mod tests;
