//! Form rendering
//!
//! The view tree, the per-kind field renderer, custom widget bindings and the
//! form component with its overridable layout.

pub use concierge_pages::*;
