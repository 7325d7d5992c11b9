use std::fmt;
use std::sync::Arc;

use crate::foundation::error::FrameryResult;
use crate::render::context::RenderContext;

type StepFn = dyn Fn(&mut RenderContext) -> FrameryResult<()> + Send + Sync;

/// A render step: a function from a [`RenderContext`] to success or error.
///
/// Steps are stateless, cheap to clone and compose into pipelines:
///
/// - [`then`](Self::then) sequences two steps, failing fast on the first error
/// - [`within`](Self::within) restricts a step to a frame-number window
/// - [`of`](Self::of) folds a whole sequence into one step
///
/// The empty step [`noop`](Self::noop) is a successful no-op and the identity
/// of `then`, so optional pipeline stages can be omitted without branching at
/// call sites.
#[derive(Clone, Default)]
pub struct RenderStep {
    inner: Option<Arc<StepFn>>,
}

impl RenderStep {
    /// Wrap a function as a render step.
    pub fn new(f: impl Fn(&mut RenderContext) -> FrameryResult<()> + Send + Sync + 'static) -> Self {
        Self {
            inner: Some(Arc::new(f)),
        }
    }

    /// The empty step: always succeeds without touching the context.
    pub fn noop() -> Self {
        Self::default()
    }

    /// True when this is the empty step.
    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Run the step; the empty step is a successful no-op.
    pub fn run(&self, ctx: &mut RenderContext) -> FrameryResult<()> {
        match &self.inner {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    /// Sequence `self` then `next`.
    ///
    /// If `self` fails, `next` never runs and the error is returned as-is.
    /// An empty operand leaves the other unchanged.
    pub fn then(&self, next: &RenderStep) -> RenderStep {
        match (&self.inner, &next.inner) {
            (None, _) => next.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => {
                let (a, b) = (Arc::clone(a), Arc::clone(b));
                RenderStep::new(move |ctx| {
                    a(ctx)?;
                    b(ctx)
                })
            }
        }
    }

    /// Restrict this step to frames in `[start, end]` inclusive; outside the
    /// window it is a successful no-op.
    pub fn within(&self, start: u64, end: u64) -> RenderStep {
        if self.is_noop() {
            return RenderStep::noop();
        }
        let step = self.clone();
        RenderStep::new(move |ctx| {
            if (start..=end).contains(&ctx.frame()) {
                step.run(ctx)
            } else {
                Ok(())
            }
        })
    }

    /// Left-fold [`then`](Self::then) over a sequence of steps.
    ///
    /// No steps yields the empty step; a single step is returned unchanged.
    pub fn of(steps: impl IntoIterator<Item = RenderStep>) -> RenderStep {
        steps
            .into_iter()
            .fold(RenderStep::noop(), |acc, s| acc.then(&s))
    }
}

impl fmt::Debug for RenderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_noop() {
            "RenderStep(noop)"
        } else {
            "RenderStep(fn)"
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/step.rs"]
mod tests;
