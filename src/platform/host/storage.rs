use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{debug, warn};

use crate::error::{Error, PlatformError};
use crate::session::{CONTAINER_FILE_NAME, ContainerSink, SessionHandle, SessionId, SessionStore};

/// Session store on a mounted filesystem.
///
/// `mount_point` plays the role of the card's mount point: it must already
/// exist as a directory, otherwise the medium counts as unavailable.
#[derive(Debug)]
pub struct FsSessionStore<R> {
    mount_point: PathBuf,
    rng: R,
    mounted: bool,
}

impl FsSessionStore<rand::rngs::ThreadRng> {
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self::with_rng(mount_point, rand::rng())
    }
}

impl<R: RngCore> FsSessionStore<R> {
    /// Use `rng` for session identifiers, e.g. a seeded generator in tests.
    pub fn with_rng(mount_point: impl Into<PathBuf>, rng: R) -> Self {
        Self {
            mount_point: mount_point.into(),
            rng,
            mounted: false,
        }
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    pub fn session_dir(&self, id: SessionId) -> PathBuf {
        self.mount_point.join(id.as_str())
    }

    pub fn container_path(&self, id: SessionId) -> PathBuf {
        self.session_dir(id).join(CONTAINER_FILE_NAME)
    }

    fn mount(&mut self) -> Result<(), Error> {
        if self.mounted {
            return Ok(());
        }
        let meta = fs::metadata(&self.mount_point)
            .map_err(|e| Error::StorageUnavailable(e.into()))?;
        if !meta.is_dir() {
            return Err(Error::StorageUnavailable(PlatformError::Message(
                "mount point is not a directory",
            )));
        }
        debug!("mounted {}", self.mount_point.display());
        self.mounted = true;
        Ok(())
    }
}

impl<R: RngCore> SessionStore for FsSessionStore<R> {
    type Sink = FsContainer;

    fn create_session(&mut self) -> Result<SessionHandle, Error> {
        self.mount()?;
        let id = SessionId::from_random(self.rng.next_u32());
        let dir = self.session_dir(id);
        // create_dir, not create_dir_all: an existing directory is an error.
        fs::create_dir(&dir).map_err(|e| Error::DirectoryCreateFailed(e.into()))?;
        debug!("created {}", dir.display());
        Ok(SessionHandle::new(id))
    }

    fn open_container(&mut self, session: &SessionHandle) -> Result<FsContainer, Error> {
        let path = self.container_path(session.id());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| Error::FileOpenFailed(e.into()))?;
        Ok(FsContainer {
            file: Some(file),
            path,
            committed: 0,
        })
    }
}

/// Motion-JPEG container file.
///
/// Frames are written unbuffered so a power loss keeps every frame that was
/// reported as appended.
#[derive(Debug)]
pub struct FsContainer {
    file: Option<File>,
    path: PathBuf,
    committed: u64,
}

impl FsContainer {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cut a partially written frame back off the end of the file.
    fn roll_back(file: &mut File, committed: u64) -> std::io::Result<()> {
        file.set_len(committed)?;
        file.seek(SeekFrom::Start(committed))?;
        Ok(())
    }
}

impl ContainerSink for FsContainer {
    fn append(&mut self, frame: &[u8]) -> Result<(), Error> {
        let file = self.file.as_mut().ok_or(Error::ContainerClosed)?;
        if let Err(e) = file.write_all(frame) {
            if let Err(rollback) = Self::roll_back(file, self.committed) {
                // The tail may hold part of a frame; appending after it would
                // corrupt the container.
                warn!(
                    "could not roll back partial frame in {}, closing: {rollback}",
                    self.path.display()
                );
                self.file = None;
            }
            return Err(Error::WriteFailed(e.into()));
        }
        self.committed += frame.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.file.take() {
            Some(file) => file.sync_all().map_err(|e| Error::WriteFailed(e.into())),
            None => Ok(()),
        }
    }

    fn len(&self) -> u64 {
        self.committed
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn store(root: &Path) -> FsSessionStore<StdRng> {
        FsSessionStore::with_rng(root, StdRng::seed_from_u64(7))
    }

    #[test]
    fn creates_session_directory_and_container() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let mut store = store(root.path());
        let session = store.create_session()?;
        assert!(store.session_dir(session.id()).is_dir());

        let mut sink = store.open_container(&session)?;
        assert_eq!(sink.path(), store.container_path(session.id()));
        sink.append(b"abc")?;
        sink.append(b"defg")?;
        assert_eq!(sink.len(), 7);
        sink.close()?;
        sink.close()?;
        assert!(sink.is_closed());

        assert_eq!(fs::read(store.container_path(session.id()))?, b"abcdefg");
        Ok(())
    }

    #[test]
    fn missing_mount_point_is_storage_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let mut store = store(&root.path().join("no-card"));
        let err = store.create_session().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)), "{err}");
    }

    #[test]
    fn file_as_mount_point_is_storage_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let not_a_dir = root.path().join("card.img");
        fs::write(&not_a_dir, b"").unwrap();
        let err = store(&not_a_dir).create_session().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)), "{err}");
    }

    #[test]
    fn existing_session_directory_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        // Same seed, same first identifier.
        let first = store(root.path()).create_session().unwrap();
        let err = store(root.path()).create_session().unwrap_err();
        assert!(matches!(err, Error::DirectoryCreateFailed(_)), "{err}");
        assert!(root.path().join(first.id().as_str()).is_dir());
    }

    #[test]
    fn existing_container_is_not_reopened() {
        let root = tempfile::tempdir().unwrap();
        let mut store = store(root.path());
        let session = store.create_session().unwrap();
        let _first = store.open_container(&session).unwrap();
        let err = store.open_container(&session).unwrap_err();
        assert!(matches!(err, Error::FileOpenFailed(_)), "{err}");
    }

    #[test]
    fn append_after_close_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let mut store = store(root.path());
        let session = store.create_session().unwrap();
        let mut sink = store.open_container(&session).unwrap();
        sink.close().unwrap();
        assert!(matches!(sink.append(b"late"), Err(Error::ContainerClosed)));
        assert!(sink.is_empty());
    }

    #[test]
    fn roll_back_cuts_partial_frame() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let mut store = store(root.path());
        let session = store.create_session()?;
        let mut sink = store.open_container(&session)?;
        sink.append(b"abcd")?;

        let file = sink.file.as_mut().unwrap();
        file.write_all(b"PARTIAL")?;
        FsContainer::roll_back(file, sink.committed)?;

        sink.append(b"ef")?;
        sink.close()?;
        assert_eq!(sink.len(), 6);
        assert_eq!(fs::read(store.container_path(session.id()))?, b"abcdef");
        Ok(())
    }

    #[test]
    fn failed_roll_back_closes_container() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let path = root.path().join(CONTAINER_FILE_NAME);
        fs::write(&path, b"abcd")?;
        // A read-only handle fails both the write and the truncate.
        let mut sink = FsContainer {
            file: Some(File::open(&path)?),
            path: path.clone(),
            committed: 4,
        };

        assert!(matches!(sink.append(b"ef"), Err(Error::WriteFailed(_))));
        assert!(sink.is_closed());
        assert!(matches!(sink.append(b"gh"), Err(Error::ContainerClosed)));
        assert_eq!(sink.len(), 4);
        assert_eq!(fs::read(&path)?, b"abcd");
        Ok(())
    }
}
