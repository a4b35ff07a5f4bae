use core::time::Duration;

/// One encoded image handed out by a [`FrameSource`](crate::FrameSource).
///
/// The frame owns a buffer from the source's pool until it is passed back to
/// [`FrameSource::release`](crate::FrameSource::release).
pub trait Frame {
    /// The encoded image, e.g. one complete JPEG.
    fn data(&self) -> &[u8];

    fn len(&self) -> usize {
        self.data().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture time on the device's monotonic clock.
    fn timestamp(&self) -> Duration;
}
