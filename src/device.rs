use crate::error::Error;
use crate::stream::FrameSource;
use crate::types::CaptureProfile;

/// A camera that can be initialised once per boot.
pub trait CameraDevice {
    type Source: FrameSource;

    fn name(&self) -> &str;

    /// Initialise the sensor with `profile` and start producing frames.
    ///
    /// Fails with [`Error::CameraInitFailed`].
    fn open(self, profile: &CaptureProfile) -> Result<Self::Source, Error>;
}
