use std::cell::RefCell;
use std::rc::{Rc, Weak};

use uiscroll::{ScrollOrigin, Settings, Viewport, ViewportError};
use web_sys::{HtmlElement, ScrollRestoration};

use crate::scheduler::{DispatchSlot, Fired};
use crate::{WebRoutines, WebScheduler};

/// The engine bound to a browser document.
pub type BrowserViewport = Viewport<WebRoutines, WebScheduler>;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no global window is available")]
    NoWindow,
    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

/// A shared handle to a [`BrowserViewport`] whose frames and tasks are wired to the browser.
///
/// Animation-frame and timeout callbacks reach the viewport through a weak reference, so a
/// dropped handle simply stops receiving them.
#[derive(Clone, Debug)]
pub struct WebViewport {
    inner: Rc<RefCell<BrowserViewport>>,
}

impl WebViewport {
    /// Binds to the content `element` and its padding children.
    ///
    /// In window mode the browser's own scroll restoration is switched to manual, since the
    /// engine positions the document itself.
    pub fn new(element: HtmlElement, settings: Settings) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        if settings.window_viewport() {
            if let Ok(history) = window.history() {
                let _ = history.set_scroll_restoration(ScrollRestoration::Manual);
            }
        }

        let slot: DispatchSlot = Rc::new(RefCell::new(None));
        let routines = WebRoutines::new(window.clone(), settings.horizontal());
        let scheduler = WebScheduler::new(window, Rc::clone(&slot));
        let viewport = Viewport::new(element, settings, routines, scheduler)?;
        let inner = Rc::new(RefCell::new(viewport));

        let weak = Rc::downgrade(&inner);
        let target: Rc<dyn Fn(Fired)> = Rc::new(move |fired: Fired| dispatch(&weak, fired));
        *slot.borrow_mut() = Some(target);
        Ok(Self { inner })
    }

    /// Runs `f` with exclusive access to the viewport.
    ///
    /// Panics if called from inside another `with` on the same handle.
    pub fn with<T>(&self, f: impl FnOnce(&mut BrowserViewport) -> T) -> T {
        f(&mut self.inner.borrow_mut())
    }

    /// Classifies a `scroll` event; see [`Viewport::on_scroll`].
    pub fn on_scroll(&self) -> ScrollOrigin {
        self.with(|v| v.on_scroll())
    }
}

fn dispatch(weak: &Weak<RefCell<BrowserViewport>>, fired: Fired) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let Ok(mut viewport) = inner.try_borrow_mut() else {
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "uiscroll::web", ?fired, "viewport busy, callback dropped");
        return;
    };
    match fired {
        Fired::Frame(frame) => {
            viewport.run_frame(frame);
        }
        Fired::Task(task) => {
            viewport.run_task(task);
        }
    }
}
