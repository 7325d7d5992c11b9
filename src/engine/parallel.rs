use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::engine::collate::{CollateBuffer, FrameResult};
use crate::foundation::error::{FrameryError, FrameryResult};
use crate::render::context::RenderContext;
use crate::render::step::RenderStep;

/// Construction parameters for a [`ParallelEngine`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Worker pool size; capped to the machine's available parallelism.
    /// Below 2 the engine runs frames sequentially on the caller's thread.
    pub workers: usize,
    /// Frame number of the first frame the driver will submit.
    pub start_frame: u64,
    /// Reorder completions back into strict frame order before sinking.
    /// Disable only when the sink is order-insensitive.
    pub collate: bool,
}

impl EngineConfig {
    /// A collated configuration starting at frame 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            start_frame: 1,
            collate: true,
        }
    }

    fn validate(&self) -> FrameryResult<()> {
        if self.workers == 0 {
            return Err(FrameryError::validation("engine workers must be >= 1"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(thread_limit(usize::MAX))
    }
}

fn thread_limit(requested: usize) -> usize {
    let cap = std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1);
    requested.clamp(1, cap)
}

struct Shared {
    task: RenderStep,
    sink: RenderStep,
    buffer: CollateBuffer,
    error: Mutex<Option<FrameryError>>,
    collate: bool,
    max_pending: usize,
}

impl Shared {
    fn error_latched(&self) -> bool {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Record the first error; later ones are dropped, the stream is already dead.
    fn latch_error(&self, err: FrameryError) {
        let mut latch = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if latch.is_none() {
            tracing::warn!(%err, "pipeline error, stopping frame scheduling");
            *latch = Some(err);
        }
    }

    fn sink_frame(&self, mut ctx: RenderContext) {
        if let Err(err) = self.sink.run(&mut ctx) {
            self.latch_error(err);
        }
    }

    fn complete(&self, frame: u64, result: FrameResult) {
        if self.collate {
            self.buffer.push(frame, result);
            return;
        }
        match result {
            Err(err) => self.latch_error(err),
            Ok(ctx) => {
                if !self.error_latched() {
                    self.sink_frame(ctx);
                }
            }
        }
    }
}

/// Renders frames concurrently on a fixed-size worker pool while the sink
/// observes them strictly in increasing frame-number order.
///
/// The driver calls [`submit`](Self::submit) once per frame; the engine clones
/// the context and queues it on a bounded channel, so submission doubles as
/// admission control. With collation enabled a single collator thread is the
/// only caller of the sink. Frame numbers must be unique and contiguous from
/// `start_frame`.
///
/// The first render or sink error latches: scheduling stops, admitted work
/// drains without reaching the sink, and [`close`](Self::close) reports the
/// error. Already-sunk frames are never rolled back.
pub struct ParallelEngine {
    mode: Mode,
    closed: bool,
}

enum Mode {
    /// Below 2 workers the coordination is not worth its cost; running
    /// `task.then(sink)` inline also gives ordered output by construction.
    Sequential { pipeline: RenderStep },
    Pool {
        jobs: Option<SyncSender<RenderContext>>,
        workers: Vec<JoinHandle<()>>,
        collator: Option<JoinHandle<()>>,
        shared: Arc<Shared>,
    },
}

impl ParallelEngine {
    /// Spawn the worker pool (and the collator when `cfg.collate` is set).
    ///
    /// `task` is the per-frame render pipeline; `sink` is the terminal step
    /// invoked once per frame, in order when collating.
    #[tracing::instrument(skip(task, sink))]
    pub fn new(cfg: EngineConfig, task: RenderStep, sink: RenderStep) -> FrameryResult<Self> {
        cfg.validate()?;
        let workers = thread_limit(cfg.workers);

        if workers < 2 {
            return Ok(Self {
                mode: Mode::Sequential {
                    pipeline: task.then(&sink),
                },
                closed: false,
            });
        }

        tracing::info!(workers, collate = cfg.collate, "starting render worker pool");

        let (tx, rx) = sync_channel::<RenderContext>(workers);
        let rx = Arc::new(Mutex::new(rx));
        let shared = Arc::new(Shared {
            task,
            sink,
            buffer: CollateBuffer::new(cfg.start_frame),
            error: Mutex::new(None),
            collate: cfg.collate,
            max_pending: workers,
        });

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let rx = Arc::clone(&rx);
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("frame-worker-{i}"))
                .spawn(move || worker_loop(&rx, &shared))
                .map_err(anyhow::Error::from)?;
            handles.push(handle);
        }

        let collator = if cfg.collate {
            let shared = Arc::clone(&shared);
            Some(
                std::thread::Builder::new()
                    .name("frame-collator".into())
                    .spawn(move || collator_loop(&shared))
                    .map_err(anyhow::Error::from)?,
            )
        } else {
            None
        };

        Ok(Self {
            mode: Mode::Pool {
                jobs: Some(tx),
                workers: handles,
                collator,
                shared,
            },
            closed: false,
        })
    }

    /// Submit one frame.
    ///
    /// Clones the context and enqueues the clone; blocks while the worker
    /// queue is full. A context flagged as the last frame closes the engine
    /// and blocks until every buffered frame has been flushed to the sink.
    /// Submitting to a closed engine is an error.
    pub fn submit(&mut self, ctx: &mut RenderContext) -> FrameryResult<()> {
        if self.closed {
            return Err(FrameryError::validation("submit on a closed engine"));
        }

        let mut should_close = false;
        match &mut self.mode {
            Mode::Sequential { pipeline } => {
                let last = ctx.is_last_frame();
                let result = pipeline.run(ctx);
                if last || result.is_err() {
                    self.closed = true;
                }
                return result;
            }
            Mode::Pool { jobs, shared, .. } => {
                if shared.error_latched() {
                    should_close = true;
                } else {
                    let Some(tx) = jobs.as_ref() else {
                        return Err(FrameryError::validation("engine input already closed"));
                    };
                    tx.send(ctx.clone_for_worker())
                        .map_err(|_| FrameryError::render("worker pool shut down unexpectedly"))?;
                    if ctx.is_last_frame() {
                        should_close = true;
                    }
                }
            }
        }

        if should_close {
            return self.close();
        }
        Ok(())
    }

    /// Close the engine: stop accepting frames, drain admitted work, flush
    /// the collator, and report the first latched error, if any.
    ///
    /// Closing is one-way and idempotent; only the first call can return an
    /// error. Called automatically when the last frame is submitted.
    #[tracing::instrument(skip(self))]
    pub fn close(&mut self) -> FrameryResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let Mode::Pool {
            jobs,
            workers,
            collator,
            shared,
        } = &mut self.mode
        else {
            return Ok(());
        };

        // Dropping the sender closes the queue; workers drain it and exit.
        drop(jobs.take());
        for handle in workers.drain(..) {
            let _ = handle.join();
        }

        // All results are buffered now, so the collator can finish its sweep.
        shared.buffer.close();
        if let Some(handle) = collator.take() {
            let _ = handle.join();
        }

        match shared
            .error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for ParallelEngine {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}

fn worker_loop(jobs: &Mutex<Receiver<RenderContext>>, shared: &Shared) {
    loop {
        let received = {
            let rx = jobs.lock().unwrap_or_else(PoisonError::into_inner);
            rx.recv()
        };
        let Ok(mut ctx) = received else {
            return; // queue closed and drained
        };

        let frame = ctx.frame();
        if shared.collate {
            shared.buffer.reserve_slot(frame, shared.max_pending);
        }

        if shared.error_latched() {
            // The result will be discarded, but the entry still flows through
            // the buffer so the collator sees a contiguous sequence.
            shared.complete(frame, Ok(ctx));
            continue;
        }

        let result = shared.task.run(&mut ctx).map(|()| ctx);
        shared.complete(frame, result);
    }
}

fn collator_loop(shared: &Shared) {
    while let Some((frame, result)) = shared.buffer.pop_next() {
        if shared.error_latched() {
            tracing::trace!(frame, "discarding frame after latched error");
            continue;
        }
        match result {
            Err(err) => shared.latch_error(err),
            Ok(ctx) => shared.sink_frame(ctx),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/parallel.rs"]
mod tests;
