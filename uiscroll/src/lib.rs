//! A headless viewport/buffer synchronization engine for windowed scrolling.
//!
//! Only the items near the visible viewport are rendered; two padding spacers stand in for
//! everything before and after them. This crate keeps the host's scroll offset, the rendered
//! window's geometry and the spacer sizes consistent, and compensates for the host's own
//! scroll anchoring when content changes above the viewport.
//!
//! It is UI-agnostic. A host layer (see the `uiscroll-web` crate for the browser) provides:
//! - element geometry and scroll-offset access through [`Routines`]
//! - animation-frame and task-queue scheduling through [`Scheduler`], feeding fired handles back
//!   into [`Viewport::run_frame`] / [`Viewport::run_task`]
//!
//! [`MemoryRoutines`] and [`ManualScheduler`] implement both for tests and simulations.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod memory;
mod padding;
mod routines;
mod scheduler;
mod settings;
mod state;
mod types;
mod viewport;

#[cfg(test)]
mod tests;

pub use memory::{ManualScheduler, MemoryNode, MemoryRoutines, NodeId};
pub use padding::{Padding, Paddings};
pub use routines::{OVERFLOW_HIDDEN, Routines};
pub use scheduler::{FrameHandle, Scheduler, TaskHandle};
pub use settings::{
    DEFAULT_BUFFER_SIZE, DEFAULT_PADDING, DEFAULT_START_INDEX, SETTING_KEYS, SettingValue,
    Settings, SettingsError, UserSettings,
};
pub use state::{ScrollStateSnapshot, State, SyntheticOutcome};
pub use types::{Direction, ScrollOrigin};
pub use viewport::{SyntheticDone, Viewport, ViewportError};
