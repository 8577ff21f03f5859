//! Application layer
//!
//! Composition root: wires the configuration loader and logger manager into
//! one explicitly threaded context.

pub mod context;

pub use context::AppContext;
