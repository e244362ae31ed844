/// Handle of a callback requested for the next rendering frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameHandle(pub u64);

/// Handle of a callback requested on the host's task queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskHandle(pub u64);

/// The host's cooperative schedulers.
///
/// The engine never hands closures to the host. It only requests a handle; when the frame or
/// task fires, the host calls [`crate::Viewport::run_frame`] or [`crate::Viewport::run_task`]
/// with that handle. Handles the engine no longer waits for are ignored there, so a host that
/// cannot cancel is still correct.
pub trait Scheduler {
    /// Requests one callback before the next repaint (`requestAnimationFrame`).
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, frame: FrameHandle);

    /// Requests one callback on the next task-queue turn (`setTimeout(_, 0)`).
    fn request_task(&mut self) -> TaskHandle;
}
