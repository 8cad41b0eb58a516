//! Named FIFO shared by a channel and its watch window.
//!
//! The producer creates the FIFO and opens it non-blocking; the window
//! reads it blocking and removes it when done.

use crate::constants::{PIPE_PREFIX, PIPE_SUFFIX, POLL_INTERVAL_MS};
use crate::error::{Result, XtbugError};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    path: PathBuf,
}

impl Transport {
    /// `<dir>/xtbug<index>.pipe`
    pub fn path_for(dir: &Path, index: u32) -> PathBuf {
        dir.join(format!("{PIPE_PREFIX}{index}{PIPE_SUFFIX}"))
    }

    /// Create a fresh FIFO for `index`, replacing whatever a previous
    /// session left at the same path.
    pub fn create(dir: &Path, index: u32) -> Result<Self> {
        let path = Self::path_for(dir, index);
        let creation_error = |source: io::Error| XtbugError::TransportCreation {
            path: path.clone(),
            source,
        };

        match fs::remove_file(&path) {
            Ok(()) => debug!(?path, "removed stale transport"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(creation_error(e)),
        }
        mkfifo(path.as_path(), Mode::S_IRUSR | Mode::S_IWUSR).map_err(|e| creation_error(e.into()))?;

        Ok(Self { path })
    }

    /// Attach to an existing path without creating anything.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the write side. Read+write plus `O_NONBLOCK` means the open
    /// succeeds with no reader attached and writes fail fast when full.
    pub fn open_writer(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(|source| XtbugError::TransportOpen {
                path: self.path.clone(),
                source,
            })
    }

    /// Open the read side without waiting for a writer, then switch the
    /// handle to blocking reads. Until a writer shows up the FIFO polls
    /// as not ready, so [`Interruptible`] covers that wait as well.
    pub fn open_reader(&self) -> Result<File> {
        let open_error = |source: io::Error| XtbugError::TransportOpen {
            path: self.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(open_error)?;

        let flags = fcntl(&file, FcntlArg::F_GETFL).map_err(|e| open_error(e.into()))?;
        let mut flags = OFlag::from_bits_truncate(flags);
        flags.remove(OFlag::O_NONBLOCK);
        fcntl(&file, FcntlArg::F_SETFL(flags)).map_err(|e| open_error(e.into()))?;

        Ok(file)
    }

    /// Unlink the FIFO. Already gone is fine.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Removes the transport path when dropped, whatever way the window exits.
pub struct TransportGuard {
    transport: Transport,
}

impl TransportGuard {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

impl Drop for TransportGuard {
    fn drop(&mut self) {
        match self.transport.remove() {
            Ok(()) => debug!(path = ?self.transport.path(), "transport removed"),
            Err(e) => warn!(path = ?self.transport.path(), "failed to remove transport: {e}"),
        }
    }
}

/// Blocking reader that gives up once `stop` is raised.
///
/// Waits in short `poll` slices so a Ctrl-C handler running on another
/// thread is noticed; cancellation surfaces as
/// [`ErrorKind::ConnectionAborted`].
pub struct Interruptible<R> {
    inner: R,
    stop: Arc<AtomicBool>,
}

impl<R> Interruptible<R> {
    pub fn new(inner: R, stop: Arc<AtomicBool>) -> Self {
        Self { inner, stop }
    }
}

impl<R: Read + AsFd> Read for Interruptible<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Err(io::Error::new(ErrorKind::ConnectionAborted, "interrupted"));
            }
            let ready = {
                let mut fds = [PollFd::new(self.inner.as_fd(), PollFlags::POLLIN)];
                poll(&mut fds, PollTimeout::from(POLL_INTERVAL_MS))
            };
            match ready {
                Ok(0) | Err(Errno::EINTR) => continue,
                Ok(_) => return self.inner.read(buf),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileTypeExt;

    #[test]
    fn path_embeds_index() {
        let path = Transport::path_for(Path::new("/tmp"), 7);
        assert_eq!(path, PathBuf::from("/tmp/xtbug7.pipe"));
    }

    #[test]
    fn create_replaces_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let stale = Transport::path_for(dir.path(), 0);
        fs::write(&stale, b"left over").unwrap();

        let transport = Transport::create(dir.path(), 0).unwrap();
        let kind = fs::metadata(transport.path()).unwrap().file_type();
        assert!(kind.is_fifo());
    }

    #[test]
    fn create_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = Transport::create(&missing, 0).unwrap_err();
        assert!(matches!(err, XtbugError::TransportCreation { .. }));
    }

    #[test]
    fn guard_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Transport::create(dir.path(), 3).unwrap();
        let path = transport.path().to_path_buf();
        drop(TransportGuard::new(transport));
        assert!(!path.exists());
    }

    #[test]
    fn remove_twice_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Transport::create(dir.path(), 1).unwrap();
        transport.remove().unwrap();
        transport.remove().unwrap();
    }

    #[test]
    fn reader_opens_without_a_writer_and_waits_interruptibly() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Transport::create(dir.path(), 4).unwrap();
        let reader = transport.open_reader().unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let raiser = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(50));
                stop.store(true, Ordering::SeqCst);
            })
        };
        let err = Interruptible::new(reader, stop)
            .read(&mut [0u8; 8])
            .unwrap_err();
        raiser.join().unwrap();
        assert_eq!(err.kind(), ErrorKind::ConnectionAborted);
    }

    #[test]
    fn reader_blocks_once_opened() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Transport::create(dir.path(), 5).unwrap();
        let reader = transport.open_reader().unwrap();
        let flags = OFlag::from_bits_truncate(fcntl(&reader, FcntlArg::F_GETFL).unwrap());
        assert!(!flags.contains(OFlag::O_NONBLOCK));
    }

    #[test]
    fn raised_stop_aborts_read() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Transport::create(dir.path(), 2).unwrap();
        let _writer = transport.open_writer().unwrap();
        let reader = transport.open_reader().unwrap();

        let stop = Arc::new(AtomicBool::new(true));
        let mut reader = Interruptible::new(reader, stop);
        let err = reader.read(&mut [0u8; 8]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionAborted);
    }
}
