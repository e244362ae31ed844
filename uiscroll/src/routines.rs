use alloc::string::String;

use crate::Direction;

/// The host capability surface: element lookup, geometry and scroll-offset access.
///
/// The engine is UI-agnostic; a host environment (browser DOM, TUI, simulation) implements this
/// trait once. Every measurement is taken along the scroll axis the implementation was built
/// for (vertical unless the session is horizontal).
///
/// Readers take `&self`; anything that changes what the user sees takes `&mut self`.
pub trait Routines {
    /// A cheap handle to a host element.
    type Element: Clone;

    /// Resolves the element whose scroll offset is authoritative for `element`.
    ///
    /// With `window_viewport` this is the document's scrolling element, otherwise the content
    /// element's parent container.
    fn host_element(&self, element: &Self::Element, window_viewport: bool)
    -> Option<Self::Element>;

    /// The document body that owns `element`.
    fn document_body(&self, element: &Self::Element) -> Option<Self::Element>;

    /// The spacer element for `direction` inside the content element.
    fn padding_element(
        &self,
        element: &Self::Element,
        direction: Direction,
    ) -> Option<Self::Element>;

    fn scroll_position(&self, element: &Self::Element) -> f64;

    /// Writes a scroll offset. The host may clamp or otherwise correct the value.
    fn set_scroll_position(&mut self, element: &Self::Element, value: f64);

    /// Extent of `element` along the scroll axis.
    fn size(&self, element: &Self::Element) -> f64;

    /// Sets the extent of a spacer element along the scroll axis.
    fn set_size(&mut self, element: &Self::Element, size: f64);

    /// Viewport-relative coordinate of the leading (`Backward`) or trailing (`Forward`) edge.
    ///
    /// `opposite` flips which edge is reported.
    fn edge(&self, element: &Self::Element, direction: Direction, opposite: bool) -> f64;

    /// Position of `element` relative to the document origin.
    fn offset(&self, element: &Self::Element) -> f64;

    /// Whether the platform's automatic scroll anchoring is confirmed off for `element`.
    fn is_anchoring_off(&self, element: &Self::Element) -> bool;

    /// Current overflow style along the scroll axis (e.g. `"auto"`, `"hidden"`, `""`).
    fn overflow(&self, element: &Self::Element) -> String;

    fn set_overflow(&mut self, element: &Self::Element, value: &str);
}

/// Overflow value that suppresses user scrolling.
pub const OVERFLOW_HIDDEN: &str = "hidden";
