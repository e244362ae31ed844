use crate::{FrameHandle, Settings};

/// Bookkeeping for an in-flight synthetic scroll correction.
///
/// Only the viewport mutates this record; everyone else reads it through
/// [`ScrollStateSnapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ScrollState {
    pub(crate) synthetic_position: Option<f64>,
    pub(crate) synthetic_fulfill: bool,
    pub(crate) animation_frame: Option<FrameHandle>,
}

impl ScrollState {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn snapshot(&self) -> ScrollStateSnapshot {
        ScrollStateSnapshot {
            synthetic_position: self.synthetic_position,
            synthetic_fulfill: self.synthetic_fulfill,
            pending_frame: self.animation_frame,
        }
    }
}

/// A read-only copy of the synthetic-scroll bookkeeping.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollStateSnapshot {
    /// The offset the engine means, even if the host currently reports another one.
    pub synthetic_position: Option<f64>,
    /// `true` once `synthetic_position` is final.
    pub synthetic_fulfill: bool,
    /// Frame the pending correction waits for.
    pub pending_frame: Option<FrameHandle>,
}

impl ScrollStateSnapshot {
    /// Whether a correction was scheduled and has not landed yet.
    ///
    /// While this holds, the host-reported scroll offset is provisional.
    pub fn is_in_flight(&self) -> bool {
        self.synthetic_position.is_some() && !self.synthetic_fulfill
    }

    /// The offset a reader should trust: the synthetic one when present, `observed` otherwise.
    pub fn effective_position(&self, observed: f64) -> f64 {
        self.synthetic_position.unwrap_or(observed)
    }
}

/// Result handed to the completion of [`crate::Viewport::set_position_safe`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntheticOutcome {
    /// The target the caller asked for.
    pub requested: f64,
    /// The compensated target that was written (`requested - compensation`).
    pub position: f64,
    /// How far the host had moved the offset backward before the final write; 0 if it did not.
    pub compensation: f64,
    /// What the host reported right after the final write.
    pub actual: f64,
}

/// Mutable per-session state shared between the viewport and the workflow.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Index of the first item in (or assumed to precede) the rendered window. Owned by the
    /// workflow; the viewport reads it on reset.
    pub start_index: i64,
    /// Backward padding size expressed in nominal items, used to bias average-size estimation.
    pub bwd_average_size_items_count: f64,
    pub(crate) scroll: ScrollState,
}

impl State {
    pub fn new(settings: &Settings) -> Self {
        Self {
            start_index: settings.start_index(),
            bwd_average_size_items_count: 0.0,
            scroll: ScrollState::default(),
        }
    }

    pub fn scroll_state(&self) -> ScrollStateSnapshot {
        self.scroll.snapshot()
    }
}
