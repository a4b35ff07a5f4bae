use core::fmt;

/// Platform-specific error details.
///
/// Backends that fail through the standard library keep the original
/// [`std::io::Error`]; everything else carries a static description.
#[derive(Debug)]
#[non_exhaustive]
pub enum PlatformError {
    Message(&'static str),
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            #[cfg(feature = "std")]
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            #[cfg(feature = "std")]
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for PlatformError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Whether a failure ends the session or only costs a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The device cannot fulfil its purpose; halt.
    Fatal,
    /// Skip this iteration and keep recording.
    Transient,
}

/// Top-level crate error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] PlatformError),
    #[error("failed to create session directory: {0}")]
    DirectoryCreateFailed(#[source] PlatformError),
    #[error("failed to open video container: {0}")]
    FileOpenFailed(#[source] PlatformError),
    #[error("camera init failed: {0}")]
    CameraInitFailed(#[source] PlatformError),
    #[error("frame unavailable")]
    FrameUnavailable,
    #[error("frame write failed: {0}")]
    WriteFailed(#[source] PlatformError),
    #[error("video container already closed")]
    ContainerClosed,
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Self::StorageUnavailable(_)
            | Self::DirectoryCreateFailed(_)
            | Self::FileOpenFailed(_)
            | Self::CameraInitFailed(_) => Severity::Fatal,
            Self::FrameUnavailable | Self::WriteFailed(_) | Self::ContainerClosed => {
                Severity::Transient
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn storage_errors_are_fatal() {
        let fatal = [
            Error::StorageUnavailable(PlatformError::Message("no card")),
            Error::DirectoryCreateFailed(PlatformError::Message("exists")),
            Error::FileOpenFailed(PlatformError::Message("read-only")),
            Error::CameraInitFailed(PlatformError::Message("no sensor")),
        ];
        assert!(fatal.iter().all(Error::is_fatal));

        let transient = [
            Error::FrameUnavailable,
            Error::WriteFailed(PlatformError::Message("card busy")),
            Error::ContainerClosed,
        ];
        assert!(transient.iter().all(|e| !e.is_fatal()));
    }

    #[test]
    fn display_includes_platform_detail() {
        let e = Error::StorageUnavailable(PlatformError::Message("mount failed"));
        assert_eq!(e.to_string(), "storage unavailable: mount failed");
        assert!(core::error::Error::source(&e).is_some());
    }
}
