/// Mutable per-frame unit of work.
pub mod context;
/// Render-step composition algebra.
pub mod step;
