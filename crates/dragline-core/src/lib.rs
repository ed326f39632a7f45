#![forbid(unsafe_code)]

//! Core: geometry, pointer samples, observable cells, and frame scheduling.
//!
//! Everything in this crate is single-threaded. Shared state lives behind
//! `Rc` and interior mutability, and the types are deliberately `!Send`.

pub mod event;
pub mod frame;
pub mod geometry;
pub mod logging;
pub mod observable;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
