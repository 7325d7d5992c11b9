use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::foundation::error::FrameryError;
use crate::render::context::RenderContext;

/// A completed frame, or the error that stopped it, keyed by frame number.
pub(crate) type FrameResult = Result<RenderContext, FrameryError>;

struct Entry {
    frame: u64,
    result: FrameResult,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frame.cmp(&other.frame)
    }
}

struct Inner {
    heap: BinaryHeap<Reverse<Entry>>,
    pending: usize,
    reserved: usize,
    next_frame: u64,
    closed: bool,
}

/// The ordering gate between workers and the collator.
///
/// Completed frames are buffered in a min-priority heap keyed by frame number.
/// [`pop_next`](Self::pop_next) releases the head only once it matches the
/// next expected frame, so the consumer observes a strictly increasing
/// sequence no matter how unevenly workers finish.
///
/// Admission is bounded: a worker must [`reserve_slot`](Self::reserve_slot)
/// before rendering, which caps the number of completed-but-unsunk frames and
/// stalls the fastest workers rather than letting the buffer grow without
/// limit. Waits block on condition variables and wake as soon as the relevant
/// counter changes.
pub(crate) struct CollateBuffer {
    inner: Mutex<Inner>,
    entry_ready: Condvar,
    slot_free: Condvar,
}

impl CollateBuffer {
    pub(crate) fn new(start_frame: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                pending: 0,
                reserved: 0,
                next_frame: start_frame,
                closed: false,
            }),
            entry_ready: Condvar::new(),
            slot_free: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the buffer has room for one more completed frame.
    ///
    /// The frame the collator is waiting on (and anything before it) is never
    /// held back; stalling it would leave the whole pipeline waiting on a
    /// frame that cannot complete.
    pub(crate) fn reserve_slot(&self, frame: u64, max_pending: usize) {
        let mut inner = self.lock();
        while !inner.closed
            && frame > inner.next_frame
            && inner.pending + inner.reserved >= max_pending
        {
            inner = self
                .slot_free
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        inner.reserved += 1;
    }

    /// Insert a completed frame, releasing the reservation taken for it.
    pub(crate) fn push(&self, frame: u64, result: FrameResult) {
        let mut inner = self.lock();
        inner.reserved = inner.reserved.saturating_sub(1);
        inner.pending += 1;
        inner.heap.push(Reverse(Entry { frame, result }));
        self.entry_ready.notify_one();
    }

    /// Remove and return the next frame in order.
    ///
    /// Blocks while the buffered minimum is still ahead of the expected frame
    /// or the buffer is empty with work outstanding. Returns `None` once the
    /// buffer is closed and fully drained. After close, remaining entries
    /// drain in heap order without waiting for stragglers.
    pub(crate) fn pop_next(&self) -> Option<(u64, FrameResult)> {
        let mut inner = self.lock();
        loop {
            let head = inner.heap.peek().map(|Reverse(e)| e.frame);
            match head {
                Some(frame) if frame <= inner.next_frame || inner.closed => {
                    if let Some(Reverse(entry)) = inner.heap.pop() {
                        inner.pending = inner.pending.saturating_sub(1);
                        inner.next_frame = inner.next_frame.max(frame + 1);
                        self.slot_free.notify_all();
                        return Some((entry.frame, entry.result));
                    }
                }
                None if inner.closed => return None,
                _ => {
                    inner = self
                        .entry_ready
                        .wait(inner)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Close the buffer: no more entries will arrive and every waiter wakes.
    pub(crate) fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        self.entry_ready.notify_all();
        self.slot_free.notify_all();
    }

    /// Number of completed-but-unsunk frames currently buffered.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.lock().pending
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/collate.rs"]
mod tests;
