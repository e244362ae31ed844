use uiscroll::{Direction, Routines};
use wasm_bindgen::JsCast;
use web_sys::{DomRect, Element, HtmlElement, Window};

/// [`Routines`] over a live browser document.
///
/// Padding elements are the content element's children marked with `data-padding-backward`
/// and `data-padding-forward`.
#[derive(Clone, Debug)]
pub struct WebRoutines {
    window: Window,
    horizontal: bool,
}

impl WebRoutines {
    pub fn new(window: Window, horizontal: bool) -> Self {
        Self { window, horizontal }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn is_scrolling_element(&self, element: &HtmlElement) -> bool {
        self.window
            .document()
            .and_then(|d| d.scrolling_element())
            .is_some_and(|s| js_sys::Object::is(s.as_ref(), element.as_ref()))
    }

    fn window_size(&self) -> f64 {
        let size = if self.horizontal {
            self.window.inner_width()
        } else {
            self.window.inner_height()
        };
        size.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    fn rect_edges(&self, rect: &DomRect) -> (f64, f64) {
        if self.horizontal {
            (rect.left(), rect.right())
        } else {
            (rect.top(), rect.bottom())
        }
    }

    fn overflow_property(&self) -> &'static str {
        if self.horizontal {
            "overflow-x"
        } else {
            "overflow-y"
        }
    }
}

fn html(element: Element) -> Option<HtmlElement> {
    element.dyn_into::<HtmlElement>().ok()
}

impl Routines for WebRoutines {
    type Element = HtmlElement;

    fn host_element(&self, element: &HtmlElement, window_viewport: bool) -> Option<HtmlElement> {
        if window_viewport {
            let document = element.owner_document()?;
            html(document.scrolling_element()?)
        } else {
            html(element.parent_element()?)
        }
    }

    fn document_body(&self, element: &HtmlElement) -> Option<HtmlElement> {
        element.owner_document()?.body()
    }

    fn padding_element(&self, element: &HtmlElement, direction: Direction) -> Option<HtmlElement> {
        let selector = match direction {
            Direction::Backward => "[data-padding-backward]",
            Direction::Forward => "[data-padding-forward]",
        };
        html(element.query_selector(selector).ok()??)
    }

    fn scroll_position(&self, element: &HtmlElement) -> f64 {
        let value = if self.horizontal {
            element.scroll_left()
        } else {
            element.scroll_top()
        };
        f64::from(value)
    }

    fn set_scroll_position(&mut self, element: &HtmlElement, value: f64) {
        let value = value.round() as i32;
        if self.horizontal {
            element.set_scroll_left(value);
        } else {
            element.set_scroll_top(value);
        }
    }

    fn size(&self, element: &HtmlElement) -> f64 {
        if self.is_scrolling_element(element) {
            return self.window_size();
        }
        let (start, end) = self.rect_edges(&element.get_bounding_client_rect());
        end - start
    }

    fn set_size(&mut self, element: &HtmlElement, size: f64) {
        let property = if self.horizontal { "width" } else { "height" };
        let value = format!("{size}px");
        if element.style().set_property(property, &value).is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "uiscroll::web", property, "failed to size padding element");
        }
    }

    fn edge(&self, element: &HtmlElement, direction: Direction, opposite: bool) -> f64 {
        let (leading, trailing) = if self.is_scrolling_element(element) {
            (0.0, self.window_size())
        } else {
            self.rect_edges(&element.get_bounding_client_rect())
        };
        match (direction, opposite) {
            (Direction::Backward, false) | (Direction::Forward, true) => leading,
            (Direction::Forward, false) | (Direction::Backward, true) => trailing,
        }
    }

    fn offset(&self, element: &HtmlElement) -> f64 {
        let (leading, _) = self.rect_edges(&element.get_bounding_client_rect());
        let scrolled = if self.horizontal {
            self.window.scroll_x()
        } else {
            self.window.scroll_y()
        };
        leading + scrolled.unwrap_or(0.0)
    }

    fn is_anchoring_off(&self, element: &HtmlElement) -> bool {
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("overflow-anchor").ok())
            .is_some_and(|value| value == "none")
    }

    fn overflow(&self, element: &HtmlElement) -> String {
        element
            .style()
            .get_property_value(self.overflow_property())
            .unwrap_or_default()
    }

    fn set_overflow(&mut self, element: &HtmlElement, value: &str) {
        let property = self.overflow_property();
        if element.style().set_property(property, value).is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "uiscroll::web", property, value, "failed to set overflow");
        }
    }
}
