use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use uiscroll::{FrameHandle, Scheduler, TaskHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fired {
    Frame(FrameHandle),
    Task(TaskHandle),
}

/// Where fired callbacks are delivered. Filled in once the viewport exists.
pub(crate) type DispatchSlot = Rc<RefCell<Option<Rc<dyn Fn(Fired)>>>>;

/// [`Scheduler`] backed by `requestAnimationFrame` and `setTimeout(_, 0)`.
#[derive(Clone)]
pub struct WebScheduler {
    window: Window,
    next_id: Rc<Cell<u64>>,
    frames: Rc<RefCell<HashMap<u64, i32>>>,
    dispatch: DispatchSlot,
}

impl WebScheduler {
    pub(crate) fn new(window: Window, dispatch: DispatchSlot) -> Self {
        Self {
            window,
            next_id: Rc::new(Cell::new(0)),
            frames: Rc::new(RefCell::new(HashMap::new())),
            dispatch,
        }
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn deliver(dispatch: &DispatchSlot, fired: Fired) {
        // Clone out so the slot is not borrowed while the viewport runs.
        let target = dispatch.borrow().clone();
        if let Some(target) = target {
            target(fired);
        }
    }
}

impl std::fmt::Debug for WebScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebScheduler")
            .field("next_id", &self.next_id.get())
            .field("pending_frames", &self.frames.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Scheduler for WebScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let id = self.next();
        let frame = FrameHandle(id);
        let frames = Rc::clone(&self.frames);
        let dispatch = Rc::clone(&self.dispatch);
        let callback = Closure::once_into_js(move || {
            frames.borrow_mut().remove(&id);
            Self::deliver(&dispatch, Fired::Frame(frame));
        });
        match self
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            Ok(raf) => {
                self.frames.borrow_mut().insert(id, raf);
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "uiscroll::web", id, "requestAnimationFrame failed");
            }
        }
        frame
    }

    fn cancel_frame(&mut self, frame: FrameHandle) {
        let raf = self.frames.borrow_mut().remove(&frame.0);
        if let Some(raf) = raf {
            let _ = self.window.cancel_animation_frame(raf);
        }
    }

    fn request_task(&mut self) -> TaskHandle {
        let task = TaskHandle(self.next());
        let dispatch = Rc::clone(&self.dispatch);
        let callback = Closure::once_into_js(move || {
            Self::deliver(&dispatch, Fired::Task(task));
        });
        if self
            .window
            .set_timeout_with_callback(callback.unchecked_ref())
            .is_err()
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "uiscroll::web", id = task.0, "setTimeout failed");
        }
        task
    }
}
