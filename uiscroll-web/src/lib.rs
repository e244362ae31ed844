//! Browser bindings for the `uiscroll` crate.
//!
//! `uiscroll` is host-agnostic: it reads and writes geometry through its `Routines` trait and
//! defers work through its `Scheduler` trait. This crate implements both over `web-sys`:
//!
//! - [`WebRoutines`]: scroll offsets, element sizes and edges, document offsets, and
//!   `overflow-anchor` detection on live DOM elements
//! - [`WebScheduler`]: `requestAnimationFrame` and `setTimeout` callbacks
//! - [`WebViewport`]: a shared viewport handle with both wired together
#![forbid(unsafe_code)]

mod routines;
mod scheduler;
mod viewport;

pub use routines::WebRoutines;
pub use scheduler::WebScheduler;
pub use viewport::{BrowserViewport, WebError, WebViewport};
