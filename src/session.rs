use core::fmt::{self, Write as _};

use arrayvec::ArrayString;

use crate::error::Error;

/// File name of the motion-JPEG container inside a session directory.
pub const CONTAINER_FILE_NAME: &str = "video.MJPEG";

const SESSION_ID_LEN: usize = 8;

/// Longest container path: `/` + 8 hex digits + `/` + file name.
pub const MAX_CONTAINER_PATH_LEN: usize = 2 + SESSION_ID_LEN + CONTAINER_FILE_NAME.len();

/// Identifier of one recording session.
///
/// Eight uppercase hex digits of a random 32-bit value. Names the session
/// directory on the storage medium.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId {
    raw: u32,
    hex: ArrayString<SESSION_ID_LEN>,
}

impl SessionId {
    pub const LEN: usize = SESSION_ID_LEN;

    pub fn from_random(raw: u32) -> Self {
        let mut hex = ArrayString::new();
        // Exactly LEN hex digits always fit.
        let _ = write!(hex, "{raw:08X}");
        Self { raw, hex }
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Session directory, e.g. `/1A2B3C4D`.
    pub fn dir_path(&self) -> ArrayString<{ SESSION_ID_LEN + 1 }> {
        let mut path = ArrayString::new();
        path.push('/');
        path.push_str(&self.hex);
        path
    }

    /// Container path, e.g. `/1A2B3C4D/video.MJPEG`.
    pub fn container_path(&self) -> ArrayString<MAX_CONTAINER_PATH_LEN> {
        let mut path = ArrayString::new();
        path.push('/');
        path.push_str(&self.hex);
        path.push('/');
        path.push_str(CONTAINER_FILE_NAME);
        path
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&self.as_str()).finish()
    }
}

/// A created session whose directory exists on the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: SessionId,
}

impl SessionHandle {
    pub fn new(id: SessionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

/// Append-only byte sink for one video container.
pub trait ContainerSink {
    /// Append one encoded frame.
    ///
    /// Either the whole frame lands after the previously committed bytes or,
    /// on [`Error::WriteFailed`], none of it does. Earlier bytes are never
    /// touched.
    fn append(&mut self, frame: &[u8]) -> Result<(), Error>;

    /// Flush and release the storage handle. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), Error>;

    /// Bytes committed so far.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_closed(&self) -> bool;
}

/// Persistent storage holding recording sessions.
pub trait SessionStore {
    type Sink: ContainerSink;

    /// Mount the medium if needed, allocate a fresh [`SessionId`] and create
    /// its directory.
    ///
    /// Fails with [`Error::StorageUnavailable`] when the medium cannot be
    /// mounted and [`Error::DirectoryCreateFailed`] when the directory already
    /// exists or the medium is read-only.
    fn create_session(&mut self) -> Result<SessionHandle, Error>;

    /// Create the session's video container. Fails with
    /// [`Error::FileOpenFailed`].
    fn open_container(&mut self, session: &SessionHandle) -> Result<Self::Sink, Error>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn id_is_eight_uppercase_hex_digits() {
        let id = SessionId::from_random(0x00ab_12cd);
        assert_eq!(id.as_str(), "00AB12CD");
        assert_eq!(id.raw(), 0x00ab_12cd);
        assert_eq!(id.dir_path().as_str(), "/00AB12CD");
        assert_eq!(id.container_path().as_str(), "/00AB12CD/video.MJPEG");
    }

    #[test]
    fn extreme_values_fit() {
        assert_eq!(SessionId::from_random(0).as_str(), "00000000");
        let max = SessionId::from_random(u32::MAX);
        assert_eq!(max.as_str(), "FFFFFFFF");
        assert_eq!(max.container_path().len(), MAX_CONTAINER_PATH_LEN);
    }

    #[test]
    fn uniform_ids_do_not_collide() {
        use rand::{RngCore, SeedableRng};
        use std::collections::HashSet;

        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut seen = HashSet::new();
        let mut previous = None;
        for _ in 0..10_000 {
            let id = SessionId::from_random(rng.next_u32());
            assert_ne!(Some(id), previous);
            seen.insert(id);
            previous = Some(id);
        }
        // A birthday collision or two is possible in 2^32, consecutive
        // repeats are not.
        assert!(seen.len() >= 9_990, "only {} distinct ids", seen.len());
    }
}
