//! An in-memory host for tests, simulations and headless embedders.
//!
//! `MemoryRoutines` keeps a flat table of nodes with just enough geometry to answer every
//! [`Routines`] query; `ManualScheduler` records requested frames and tasks so the caller
//! decides when they fire.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::{Direction, FrameHandle, Routines, Scheduler, TaskHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryNode {
    pub parent: Option<NodeId>,
    /// Extent along the scroll axis.
    pub size: f64,
    /// Distance from the document origin.
    pub offset: f64,
    /// Viewport-relative leading edge; the trailing edge is `edge_start + size`.
    pub edge_start: f64,
    pub scroll_position: f64,
    /// Upper clamp for `scroll_position`. Unbounded when `None`.
    pub max_scroll: Option<f64>,
    pub anchoring_off: bool,
    pub overflow: String,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRoutines {
    nodes: Vec<MemoryNode>,
    body: Option<NodeId>,
    scrolling_element: Option<NodeId>,
    paddings: Vec<(NodeId, Direction, NodeId)>,
    scroll_writes: usize,
}

impl MemoryRoutines {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bounded container of `viewport_size` holding a content element with both spacers.
    ///
    /// Returns the routines and the content element.
    pub fn container(viewport_size: f64) -> (Self, NodeId) {
        let mut r = Self::new();
        let host = r.add_node(MemoryNode {
            size: viewport_size,
            overflow: "auto".to_string(),
            ..MemoryNode::default()
        });
        let content = r.add_node(MemoryNode {
            parent: Some(host),
            ..MemoryNode::default()
        });
        r.add_paddings(content);
        (r, content)
    }

    /// A document whose scrolling element is `viewport_size` tall, with the content element
    /// directly under the body.
    ///
    /// Returns the routines and the content element.
    pub fn window(viewport_size: f64) -> (Self, NodeId) {
        let mut r = Self::new();
        let scrolling = r.add_node(MemoryNode {
            size: viewport_size,
            ..MemoryNode::default()
        });
        let body = r.add_node(MemoryNode {
            parent: Some(scrolling),
            ..MemoryNode::default()
        });
        let content = r.add_node(MemoryNode {
            parent: Some(body),
            ..MemoryNode::default()
        });
        r.set_scrolling_element(scrolling);
        r.set_body(body);
        r.add_paddings(content);
        (r, content)
    }

    fn add_paddings(&mut self, content: NodeId) {
        for direction in [Direction::Backward, Direction::Forward] {
            let padding = self.add_node(MemoryNode {
                parent: Some(content),
                ..MemoryNode::default()
            });
            self.attach_padding(content, direction, padding);
        }
    }

    pub fn add_node(&mut self, node: MemoryNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Panics if `id` was not created by this instance.
    pub fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.0]
    }

    /// Panics if `id` was not created by this instance.
    pub fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
        &mut self.nodes[id.0]
    }

    pub fn set_body(&mut self, id: NodeId) {
        self.body = Some(id);
    }

    pub fn set_scrolling_element(&mut self, id: NodeId) {
        self.scrolling_element = Some(id);
    }

    pub fn attach_padding(&mut self, content: NodeId, direction: Direction, padding: NodeId) {
        self.paddings
            .retain(|&(c, d, _)| !(c == content && d == direction));
        self.paddings.push((content, direction, padding));
    }

    /// Moves the scroll offset the way native scroll anchoring would, without counting it as
    /// a write.
    pub fn shift_scroll(&mut self, id: NodeId, delta: f64) {
        let value = self.node(id).scroll_position + delta;
        self.node_mut(id).scroll_position = self.clamp_scroll(id, value);
    }

    /// Number of scroll-offset writes received through [`Routines::set_scroll_position`].
    pub fn scroll_writes(&self) -> usize {
        self.scroll_writes
    }

    fn clamp_scroll(&self, id: NodeId, value: f64) -> f64 {
        let value = value.max(0.0);
        match self.node(id).max_scroll {
            Some(max) => value.min(max.max(0.0)),
            None => value,
        }
    }

    fn get(&self, id: &NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)
    }
}

impl Routines for MemoryRoutines {
    type Element = NodeId;

    fn host_element(&self, element: &NodeId, window_viewport: bool) -> Option<NodeId> {
        if window_viewport {
            self.scrolling_element
        } else {
            self.get(element)?.parent
        }
    }

    fn document_body(&self, _element: &NodeId) -> Option<NodeId> {
        self.body
    }

    fn padding_element(&self, element: &NodeId, direction: Direction) -> Option<NodeId> {
        self.paddings
            .iter()
            .find(|&&(c, d, _)| c == *element && d == direction)
            .map(|&(_, _, p)| p)
    }

    fn scroll_position(&self, element: &NodeId) -> f64 {
        self.get(element).map_or(0.0, |n| n.scroll_position)
    }

    fn set_scroll_position(&mut self, element: &NodeId, value: f64) {
        if self.get(element).is_none() {
            return;
        }
        self.scroll_writes += 1;
        let value = self.clamp_scroll(*element, value);
        self.node_mut(*element).scroll_position = value;
    }

    fn size(&self, element: &NodeId) -> f64 {
        self.get(element).map_or(0.0, |n| n.size)
    }

    fn set_size(&mut self, element: &NodeId, size: f64) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.size = size;
        }
    }

    fn edge(&self, element: &NodeId, direction: Direction, opposite: bool) -> f64 {
        let Some(node) = self.get(element) else {
            return 0.0;
        };
        let leading = matches!(
            (direction, opposite),
            (Direction::Backward, false) | (Direction::Forward, true)
        );
        if leading {
            node.edge_start
        } else {
            node.edge_start + node.size
        }
    }

    fn offset(&self, element: &NodeId) -> f64 {
        self.get(element).map_or(0.0, |n| n.offset)
    }

    fn is_anchoring_off(&self, element: &NodeId) -> bool {
        self.get(element).is_some_and(|n| n.anchoring_off)
    }

    fn overflow(&self, element: &NodeId) -> String {
        self.get(element)
            .map(|n| n.overflow.clone())
            .unwrap_or_default()
    }

    fn set_overflow(&mut self, element: &NodeId, value: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.overflow = value.to_string();
        }
    }
}

/// A [`Scheduler`] whose frames and tasks fire only when the caller says so.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    frames: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    tasks: Vec<TaskHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not cancelled, oldest first.
    pub fn pending_frames(&self) -> &[FrameHandle] {
        &self.frames
    }

    pub fn cancelled_frames(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    pub fn pending_tasks(&self) -> &[TaskHandle] {
        &self.tasks
    }

    /// Drains requested frames so the caller can fire them.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        core::mem::take(&mut self.frames)
    }

    /// Drains requested tasks so the caller can fire them.
    pub fn take_tasks(&mut self) -> Vec<TaskHandle> {
        core::mem::take(&mut self.tasks)
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let frame = FrameHandle(self.next());
        self.frames.push(frame);
        frame
    }

    fn cancel_frame(&mut self, frame: FrameHandle) {
        let before = self.frames.len();
        self.frames.retain(|&f| f != frame);
        if self.frames.len() != before {
            self.cancelled.push(frame);
        }
    }

    fn request_task(&mut self) -> TaskHandle {
        let task = TaskHandle(self.next());
        self.tasks.push(task);
        task
    }
}
