use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::routines::OVERFLOW_HIDDEN;
use crate::{
    Direction, FrameHandle, Paddings, Routines, Scheduler, ScrollOrigin, ScrollStateSnapshot,
    Settings, State, SyntheticOutcome, TaskHandle,
};

/// Completion of a synthetic correction.
///
/// It receives the viewport back so the workflow can continue from inside the frame.
pub type SyntheticDone<R, S> = Box<dyn FnOnce(&mut Viewport<R, S>, SyntheticOutcome)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("no scroll host element found for the viewport")]
    MissingHost,
    #[error("no document body found for a window viewport")]
    MissingBody,
    #[error("no {0:?} padding element found inside the viewport")]
    MissingPadding(Direction),
}

struct PendingCorrection<R: Routines, S> {
    frame: FrameHandle,
    old_pos: f64,
    new_pos: f64,
    done: SyntheticDone<R, S>,
}

#[derive(Clone, Debug)]
struct ScrollLock {
    task: TaskHandle,
    overflow: String,
}

/// Scroll-offset and geometry owner of one scrolling session.
///
/// The viewport keeps three things consistent: the host's scroll offset, the geometry of the
/// rendered window, and the two padding spacers standing in for everything outside it. It also
/// owns the synthetic-position protocol used to land on an exact offset while the host applies
/// its own scroll anchoring after layout.
///
/// The host drives deferred work: whatever [`Scheduler`] hands out must eventually come back via
/// [`Viewport::run_frame`] / [`Viewport::run_task`].
pub struct Viewport<R: Routines, S> {
    settings: Settings,
    routines: R,
    scheduler: S,
    state: State,
    paddings: Paddings<R::Element>,

    element: R::Element,
    host_element: R::Element,
    body: Option<R::Element>,

    offset: f64,
    start_delta: f64,
    previous_position: f64,
    scroll_anchoring: bool,

    scroll_lock: Option<ScrollLock>,
    pending: Option<PendingCorrection<R, S>>,
}

impl<R: Routines, S: Scheduler> Viewport<R, S> {
    /// Binds a viewport to the content `element`.
    ///
    /// Resolves the scroll host, the document body (window mode only) and both padding
    /// elements through `routines`.
    pub fn new(
        element: R::Element,
        settings: Settings,
        routines: R,
        scheduler: S,
    ) -> Result<Self, ViewportError> {
        let window_viewport = settings.window_viewport();
        let host_element = routines
            .host_element(&element, window_viewport)
            .ok_or(ViewportError::MissingHost)?;
        let body = if window_viewport {
            Some(
                routines
                    .document_body(&element)
                    .ok_or(ViewportError::MissingBody)?,
            )
        } else {
            None
        };
        let backward = routines
            .padding_element(&element, Direction::Backward)
            .ok_or(ViewportError::MissingPadding(Direction::Backward))?;
        let forward = routines
            .padding_element(&element, Direction::Forward)
            .ok_or(ViewportError::MissingPadding(Direction::Forward))?;

        sdebug!(window_viewport, "Viewport::new");
        let state = State::new(&settings);
        Ok(Self {
            settings,
            routines,
            scheduler,
            state,
            paddings: Paddings::new(backward, forward),
            element,
            host_element,
            body,
            offset: 0.0,
            start_delta: 0.0,
            previous_position: 0.0,
            scroll_anchoring: false,
            scroll_lock: None,
            pending: None,
        })
    }

    /// Re-derives geometry for a fresh window starting at `state.start_index`.
    ///
    /// `scroll_position` is the caller's last known offset; it becomes
    /// [`Self::previous_position`] whether or not the live offset had to move. Afterwards the
    /// live offset equals the backward padding size, the synthetic bookkeeping is empty and any
    /// pending correction has been cancelled.
    pub fn reset(&mut self, scroll_position: f64) {
        self.drop_pending();
        self.set_offset();

        let size = self.size();
        self.paddings.reset(
            &mut self.routines,
            &self.settings,
            size,
            self.state.start_index,
            self.offset,
        );

        let mut new_position = 0.0;
        let negative_size = self.paddings.backward.size();
        if negative_size > 0.0 {
            new_position = negative_size;
            self.state.bwd_average_size_items_count = match self.settings.known_item_size() {
                Some(item_size) => negative_size / item_size,
                None => 0.0,
            };
        }
        self.set_position(new_position);
        self.previous_position = scroll_position;

        self.state.scroll.reset();
        self.start_delta = 0.0;
        self.scroll_anchoring = !self.is_anchoring_off();
        sdebug!(
            from = scroll_position,
            to = new_position,
            offset = self.offset,
            scroll_anchoring = self.scroll_anchoring,
            "Viewport::reset"
        );
    }

    pub fn scroll_position(&self) -> f64 {
        self.routines.scroll_position(&self.host_element)
    }

    /// Setter counterpart of [`Self::scroll_position`]; see [`Self::set_position`].
    pub fn set_scroll_position(&mut self, value: f64) {
        self.set_position(value);
    }

    /// Writes `value` as the live scroll offset and returns what the host actually applied.
    ///
    /// Writing the current offset is a no-op: the host is not touched.
    pub fn set_position(&mut self, value: f64) -> f64 {
        let old_position = self.scroll_position();
        if old_position == value {
            strace!(position = value, "setting scroll position [cancelled]");
            return value;
        }
        self.previous_position = old_position;
        self.routines.set_scroll_position(&self.host_element, value);
        let position = self.scroll_position();
        if position != value {
            strace!(position, requested = value, "setting scroll position (corrected)");
        } else {
            strace!(position, "setting scroll position");
        }
        position
    }

    /// Lands on `new_pos` after the host has had a chance to apply its own scroll anchoring.
    ///
    /// `old_pos` is written now as a placeholder. On the next frame, if the host moved the
    /// offset backward from `old_pos` by `diff`, the target becomes `new_pos - diff`; then the
    /// target is written and `done` runs exactly once.
    ///
    /// Until then, readers must trust [`State::scroll_state`] rather than the raw offset.
    /// Calling this again before the frame fires cancels the earlier correction; its `done`
    /// is dropped without running.
    pub fn set_position_safe(
        &mut self,
        old_pos: f64,
        new_pos: f64,
        done: impl FnOnce(&mut Self, SyntheticOutcome) + 'static,
    ) {
        if let Some(prev) = self.pending.take() {
            sdebug!(
                frame = prev.frame.0,
                new_pos = prev.new_pos,
                "synthetic correction superseded"
            );
            self.scheduler.cancel_frame(prev.frame);
        }

        self.state.scroll.synthetic_position = Some(new_pos);
        strace!(
            position = old_pos,
            meaning = new_pos,
            "setting scroll position (meaning target in next repaint)"
        );
        self.routines.set_scroll_position(&self.host_element, old_pos);
        self.state.scroll.synthetic_fulfill = false;

        let frame = self.scheduler.request_frame();
        self.state.scroll.animation_frame = Some(frame);
        self.pending = Some(PendingCorrection {
            frame,
            old_pos,
            new_pos,
            done: Box::new(done),
        });
    }

    /// Runs the deferred half of [`Self::set_position_safe`] for `frame`.
    ///
    /// Returns `false` for frames nothing is waiting for (superseded or cancelled ones).
    pub fn run_frame(&mut self, frame: FrameHandle) -> bool {
        let Some(pending) = self.pending.take_if(|p| p.frame == frame) else {
            strace!(frame = frame.0, "stale animation frame ignored");
            return false;
        };
        self.state.scroll.animation_frame = None;

        let PendingCorrection {
            old_pos,
            new_pos: requested,
            done,
            ..
        } = pending;
        let diff = old_pos - self.scroll_position();
        let mut new_pos = requested;
        if diff > 0.0 {
            new_pos -= diff;
            self.state.scroll.synthetic_position = Some(new_pos);
        }
        self.state.scroll.synthetic_fulfill = true;
        if diff > 0.0 {
            sdebug!(
                position = new_pos,
                requested,
                diff,
                "setting scroll position - synthetic fulfillment (compensated)"
            );
        } else {
            strace!(position = new_pos, "setting scroll position - synthetic fulfillment");
        }
        self.routines.set_scroll_position(&self.host_element, new_pos);

        let outcome = SyntheticOutcome {
            requested,
            position: new_pos,
            compensation: diff.max(0.0),
            actual: self.scroll_position(),
        };
        done(self, outcome);
        true
    }

    /// Cancels a pending synthetic correction without running its completion.
    ///
    /// Returns `false` if nothing was pending.
    pub fn cancel_synthetic(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.drop_pending();
        self.state.scroll.reset();
        sdebug!("synthetic correction cancelled");
        true
    }

    fn drop_pending(&mut self) {
        if let Some(prev) = self.pending.take() {
            self.scheduler.cancel_frame(prev.frame);
        }
    }

    /// Classifies the scroll event the host just observed.
    ///
    /// Events are synthetic while a correction is in flight, or when the offset equals the
    /// fulfilled synthetic position. A fulfilled position is consumed by the first event that
    /// observes it.
    pub fn on_scroll(&mut self) -> ScrollOrigin {
        let Some(synthetic) = self.state.scroll.synthetic_position else {
            return ScrollOrigin::User;
        };
        let position = self.scroll_position();
        let fulfilled = self.state.scroll.synthetic_fulfill;
        if fulfilled {
            self.state.scroll.synthetic_position = None;
        }
        if !fulfilled || synthetic == position {
            strace!(position, synthetic, "skipping scroll [pre-synthetic]");
            return ScrollOrigin::Synthetic;
        }
        ScrollOrigin::User
    }

    /// Locks user scrolling until the next task-queue turn.
    ///
    /// Does nothing while already locked or when the host's overflow is already hidden, so the
    /// original overflow can never be restored early.
    pub fn disable_scroll_for_one_loop(&mut self) {
        if self.scroll_lock.is_some() {
            return;
        }
        let overflow = self.routines.overflow(&self.host_element);
        if overflow == OVERFLOW_HIDDEN {
            return;
        }
        let task = self.scheduler.request_task();
        strace!(task = task.0, overflow = overflow.as_str(), "scroll disabled for one loop");
        self.scroll_lock = Some(ScrollLock { task, overflow });
        self.routines
            .set_overflow(&self.host_element, OVERFLOW_HIDDEN);
    }

    /// Runs a task previously requested from the [`Scheduler`].
    ///
    /// Returns `false` for tasks nothing is waiting for.
    pub fn run_task(&mut self, task: TaskHandle) -> bool {
        let Some(lock) = self.scroll_lock.take_if(|l| l.task == task) else {
            return false;
        };
        strace!(task = task.0, "scroll enabled");
        self.routines.set_overflow(&self.host_element, &lock.overflow);
        true
    }

    pub fn is_scroll_disabled(&self) -> bool {
        self.scroll_lock.is_some()
    }

    /// Host viewport size along the scroll axis.
    pub fn size(&self) -> f64 {
        self.routines.size(&self.host_element)
    }

    /// Size of the whole content element, paddings included.
    pub fn scrollable_size(&self) -> f64 {
        self.routines.size(&self.element)
    }

    /// Size of the look-ahead zone that triggers fetching.
    pub fn buffer_padding(&self) -> f64 {
        self.size() * self.settings.padding()
    }

    pub fn edge(&self, direction: Direction, opposite: bool) -> f64 {
        self.routines.edge(&self.host_element, direction, opposite)
    }

    pub fn element_edge(&self, element: &R::Element, direction: Direction, opposite: bool) -> f64 {
        self.routines.edge(element, direction, opposite)
    }

    /// Recomputes the distance from the content start to the host start.
    pub fn set_offset(&mut self) {
        let mut offset = self.routines.offset(&self.element);
        if !self.settings.window_viewport() {
            offset -= self.routines.offset(&self.host_element);
        }
        self.offset = offset;
    }

    /// Whether native scroll anchoring is confirmed off.
    ///
    /// In window mode both the document body and the scrolling element must report it off,
    /// since either level can govern anchoring.
    pub fn is_anchoring_off(&self) -> bool {
        let host_off = self.routines.is_anchoring_off(&self.host_element);
        match &self.body {
            Some(body) if self.settings.window_viewport() => {
                host_off && self.routines.is_anchoring_off(body)
            }
            _ => host_off,
        }
    }

    pub fn set_padding_size(&mut self, direction: Direction, size: f64) {
        self.paddings
            .by_direction_mut(direction, false)
            .set_size(&mut self.routines, size);
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn start_delta(&self) -> f64 {
        self.start_delta
    }

    pub fn set_start_delta(&mut self, start_delta: f64) {
        self.start_delta = start_delta;
    }

    pub fn previous_position(&self) -> f64 {
        self.previous_position
    }

    /// Whether the host may apply its own scroll anchoring during this session.
    pub fn scroll_anchoring(&self) -> bool {
        self.scroll_anchoring
    }

    pub fn scroll_state(&self) -> ScrollStateSnapshot {
        self.state.scroll_state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn paddings(&self) -> &Paddings<R::Element> {
        &self.paddings
    }

    pub fn element(&self) -> &R::Element {
        &self.element
    }

    pub fn host_element(&self) -> &R::Element {
        &self.host_element
    }

    pub fn routines(&self) -> &R {
        &self.routines
    }

    pub fn routines_mut(&mut self) -> &mut R {
        &mut self.routines
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<R, S> fmt::Debug for Viewport<R, S>
where
    R: Routines,
    R::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("paddings", &self.paddings)
            .field("element", &self.element)
            .field("host_element", &self.host_element)
            .field("offset", &self.offset)
            .field("start_delta", &self.start_delta)
            .field("previous_position", &self.previous_position)
            .field("scroll_anchoring", &self.scroll_anchoring)
            .field("scroll_lock", &self.scroll_lock)
            .field("pending_frame", &self.pending.as_ref().map(|p| p.frame))
            .finish_non_exhaustive()
    }
}
