//! Form state engine
//!
//! Field schemas, validation rules, the engine holding values and errors, and
//! the [`FormHandle`](concierge_forms::FormHandle) that drives submission.

pub use concierge_forms::*;
