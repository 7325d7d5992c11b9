/// Mutable per-stream cursor and bounded iterators.
pub mod cursor;
/// Immutable timecode fragment with total ordering and frame arithmetic.
pub mod fragment;
