use super::*;
use crate::engine::sink::{InMemorySink, SinkConfig, sink_step};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

fn cfg(workers: usize, collate: bool) -> EngineConfig {
    EngineConfig {
        workers,
        start_frame: 1,
        collate,
    }
}

fn sink_cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        frame_rate: 30,
    }
}

fn drive(engine: &mut ParallelEngine, frames: u64) -> FrameryResult<()> {
    for frame in 1..=frames {
        let mut ctx = RenderContext::new(frame, 2, 2)?;
        ctx.set_last_frame(frame == frames);
        engine.submit(&mut ctx)?;
    }
    Ok(())
}

#[test]
fn config_rejects_zero_workers() {
    let err = ParallelEngine::new(cfg(0, true), RenderStep::noop(), RenderStep::noop());
    assert!(matches!(err, Err(FrameryError::Validation(_))));
}

#[test]
fn single_worker_runs_sequentially_on_the_caller() {
    let caller = std::thread::current().id();
    let ran_on = Arc::new(Mutex::new(None));

    let task = {
        let ran_on = Arc::clone(&ran_on);
        RenderStep::new(move |ctx| {
            *ran_on.lock().unwrap() = Some(std::thread::current().id());
            ctx.image_mut().fill([7, 7, 7, 255]);
            Ok(())
        })
    };

    let sink = InMemorySink::new();
    let mut engine =
        ParallelEngine::new(cfg(1, true), task, sink_step(sink.clone(), sink_cfg())).unwrap();
    drive(&mut engine, 3).unwrap();

    assert_eq!(*ran_on.lock().unwrap(), Some(caller));
    assert_eq!(sink.frame_numbers(), vec![1, 2, 3]);
    assert!(sink.is_ended());
    assert_eq!(sink.frames()[0].1.data()[0], 7);
}

#[test]
fn sequential_path_matches_direct_pipeline_invocation() {
    let task = RenderStep::new(|ctx| {
        let frame = ctx.frame() as u8;
        ctx.image_mut().fill([frame, 0, 0, 255]);
        Ok(())
    });

    // Reference: run task.then(sink) by hand.
    let reference = InMemorySink::new();
    let pipeline = task.then(&sink_step(reference.clone(), sink_cfg()));
    for frame in 1..=4u64 {
        let mut ctx = RenderContext::new(frame, 2, 2).unwrap();
        ctx.set_last_frame(frame == 4);
        pipeline.run(&mut ctx).unwrap();
    }

    let sink = InMemorySink::new();
    let mut engine =
        ParallelEngine::new(cfg(1, true), task, sink_step(sink.clone(), sink_cfg())).unwrap();
    drive(&mut engine, 4).unwrap();

    assert_eq!(sink.frames(), reference.frames());
}

#[test]
fn submit_after_close_is_an_error() {
    let sink = InMemorySink::new();
    let mut engine = ParallelEngine::new(
        cfg(4, true),
        RenderStep::noop(),
        sink_step(sink.clone(), sink_cfg()),
    )
    .unwrap();
    drive(&mut engine, 2).unwrap();

    let mut late = RenderContext::new(3, 2, 2).unwrap();
    assert!(matches!(
        engine.submit(&mut late),
        Err(FrameryError::Validation(_))
    ));
}

#[test]
fn close_is_idempotent() {
    let mut engine =
        ParallelEngine::new(cfg(4, true), RenderStep::noop(), RenderStep::noop()).unwrap();
    engine.close().unwrap();
    engine.close().unwrap();
}

#[test]
fn completed_but_unsunk_frames_stay_bounded() {
    let workers = 4;
    let in_flight = Arc::new(AtomicI64::new(0));
    let max_seen = Arc::new(AtomicI64::new(0));

    // Frame 1 finishes last; everything else completes immediately.
    let task = {
        let in_flight = Arc::clone(&in_flight);
        let max_seen = Arc::clone(&max_seen);
        RenderStep::new(move |ctx| {
            if ctx.frame() == 1 {
                std::thread::sleep(Duration::from_millis(150));
            }
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            Ok(())
        })
    };

    let sink = {
        let in_flight = Arc::clone(&in_flight);
        RenderStep::new(move |_| {
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
    };

    let mut engine = ParallelEngine::new(cfg(workers, true), task, sink).unwrap();
    drive(&mut engine, 32).unwrap();

    let bound = thread_limit(workers) as i64;
    assert!(
        max_seen.load(Ordering::SeqCst) <= bound + 1,
        "held {} completed frames with a pool of {}",
        max_seen.load(Ordering::SeqCst),
        bound
    );
}

#[test]
fn uncollated_engine_sinks_every_frame_exactly_once() {
    let committed = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let committed = Arc::clone(&committed);
        RenderStep::new(move |ctx| {
            committed.lock().unwrap().push(ctx.frame());
            Ok(())
        })
    };

    let mut engine = ParallelEngine::new(cfg(4, false), RenderStep::noop(), sink).unwrap();
    drive(&mut engine, 20).unwrap();

    let mut frames = committed.lock().unwrap().clone();
    frames.sort_unstable();
    assert_eq!(frames, (1..=20).collect::<Vec<_>>());
}

#[test]
fn render_error_surfaces_from_close_and_halts_emission() {
    let task = RenderStep::new(|ctx| {
        if ctx.frame() == 5 {
            Err(FrameryError::render("frame 5 failed"))
        } else {
            Ok(())
        }
    });

    let sunk = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let sunk = Arc::clone(&sunk);
        RenderStep::new(move |ctx| {
            sunk.lock().unwrap().push(ctx.frame());
            Ok(())
        })
    };

    let mut engine = ParallelEngine::new(cfg(4, true), task, sink).unwrap();
    let result = drive(&mut engine, 10).and_then(|()| engine.close());
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "render error: frame 5 failed");

    let sunk = sunk.lock().unwrap();
    assert_eq!(*sunk, vec![1, 2, 3, 4], "sink saw frames at or past the failure");
}

#[test]
fn sink_error_latches_too() {
    let sink = RenderStep::new(|ctx| {
        if ctx.frame() == 3 {
            Err(FrameryError::sink("disk full"))
        } else {
            Ok(())
        }
    });

    let mut engine = ParallelEngine::new(cfg(4, true), RenderStep::noop(), sink).unwrap();
    let result = drive(&mut engine, 6).and_then(|()| engine.close());
    assert_eq!(result.unwrap_err().to_string(), "sink error: disk full");
}

#[test]
fn worker_count_is_capped_to_available_parallelism() {
    let cap = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
    assert_eq!(thread_limit(1_000_000), cap);
    assert_eq!(thread_limit(1), 1);
}
