use crate::{Direction, Routines, Settings};

/// A spacer standing in for the unrendered items on one side of the rendered window.
#[derive(Clone, Debug)]
pub struct Padding<E> {
    direction: Direction,
    element: E,
    size: f64,
}

impl<E> Padding<E> {
    pub(crate) fn new(direction: Direction, element: E) -> Self {
        Self {
            direction,
            element,
            size: 0.0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Resizes the spacer. Negative and non-finite sizes are stored as 0.
    pub fn set_size<R>(&mut self, routines: &mut R, size: f64)
    where
        R: Routines<Element = E>,
    {
        let size = if size.is_finite() { size.max(0.0) } else { 0.0 };
        strace!(direction = ?self.direction, from = self.size, to = size, "Padding::set_size");
        self.size = size;
        routines.set_size(&self.element, size);
    }
}

/// The backward and forward spacers of one session.
#[derive(Clone, Debug)]
pub struct Paddings<E> {
    pub backward: Padding<E>,
    pub forward: Padding<E>,
}

impl<E> Paddings<E> {
    pub(crate) fn new(backward: E, forward: E) -> Self {
        Self {
            backward: Padding::new(Direction::Backward, backward),
            forward: Padding::new(Direction::Forward, forward),
        }
    }

    /// The spacer on the `direction` side, or on the other side when `opposite` is set.
    pub fn by_direction(&self, direction: Direction, opposite: bool) -> &Padding<E> {
        let direction = if opposite {
            direction.opposite()
        } else {
            direction
        };
        match direction {
            Direction::Backward => &self.backward,
            Direction::Forward => &self.forward,
        }
    }

    pub fn by_direction_mut(&mut self, direction: Direction, opposite: bool) -> &mut Padding<E> {
        let direction = if opposite {
            direction.opposite()
        } else {
            direction
        };
        match direction {
            Direction::Backward => &mut self.backward,
            Direction::Forward => &mut self.forward,
        }
    }

    /// Sizes both spacers for a fresh window that starts at `start_index`.
    ///
    /// With a known item size, bounded index ranges are represented exactly; an unbounded
    /// forward side gets one viewport of room so the window can grow.
    pub fn reset<R>(
        &mut self,
        routines: &mut R,
        settings: &Settings,
        viewport_size: f64,
        start_index: i64,
        offset: f64,
    ) where
        R: Routines<Element = E>,
    {
        let forward = forward_size(settings, viewport_size, start_index, offset);
        let backward = backward_size(settings, start_index);
        sdebug!(backward, forward, start_index, "Paddings::reset");
        self.forward.set_size(routines, forward);
        self.backward.set_size(routines, backward);
    }
}

fn forward_size(settings: &Settings, viewport_size: f64, start_index: i64, offset: f64) -> f64 {
    let mut size = match (settings.max_index(), settings.known_item_size()) {
        (Some(max), Some(item_size)) => (max as f64 - start_index as f64 + 1.0) * item_size,
        _ => viewport_size,
    };
    if offset > 0.0 {
        size -= offset;
    }
    size.max(0.0)
}

fn backward_size(settings: &Settings, start_index: i64) -> f64 {
    match (settings.min_index(), settings.known_item_size()) {
        (Some(min), Some(item_size)) => ((start_index as f64 - min as f64) * item_size).max(0.0),
        _ => 0.0,
    }
}
