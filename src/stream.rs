use crate::frame::Frame;

/// Pull-based delivery of encoded frames from a fixed buffer pool.
pub trait FrameSource {
    type Frame: Frame;

    /// Take the most recent frame, if one is ready.
    ///
    /// Never blocks longer than one sensor frame interval. Returns `None`
    /// when capture failed or every pool buffer is still held by the caller.
    fn try_get_frame(&mut self) -> Option<Self::Frame>;

    /// Hand the frame's buffer back to the pool.
    fn release(&mut self, frame: Self::Frame);

    /// Size of the buffer pool.
    fn buffer_count(&self) -> usize;

    /// Frames taken and not yet released.
    fn outstanding(&self) -> usize;
}
