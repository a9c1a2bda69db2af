//! Helpers that open real kernel resources of each kind for tests.
//!
//! Every helper returns an owning handle; the fd stays valid until the
//! handle is dropped. Used by the unit tests here and re-exported for the
//! integration tests behind the `test-utils` feature.

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};
use tempfile::NamedTempFile;

/// Both ends of an anonymous pipe.
#[derive(Debug)]
pub struct PipePair {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

/// Open a regular file backed by a tempfile.
pub fn open_temp_file() -> io::Result<NamedTempFile> {
    NamedTempFile::new()
}

/// Open a connected unix socket pair.
pub fn open_socket_pair() -> io::Result<(UnixStream, UnixStream)> {
    UnixStream::pair()
}

/// Open an anonymous pipe via `pipe(2)`.
pub fn open_pipe() -> io::Result<PipePair> {
    let mut fds = [0 as RawFd; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    unsafe {
        Ok(PipePair {
            read: OwnedFd::from_raw_fd(fds[0]),
            write: OwnedFd::from_raw_fd(fds[1]),
        })
    }
}

/// Open a character device (`/dev/null`).
pub fn open_char_device() -> io::Result<File> {
    File::open("/dev/null")
}

/// Open a directory descriptor.
pub fn open_directory() -> io::Result<File> {
    File::open(std::env::temp_dir())
}

/// Create a symlink inside `dir` and open it with `O_PATH | O_NOFOLLOW`,
/// yielding a descriptor that stats as the link itself.
pub fn open_symlink(dir: &Path) -> io::Result<OwnedFd> {
    let target = dir.join("target");
    std::fs::write(&target, b"x")?;
    let link = dir.join("link");
    std::os::unix::fs::symlink(&target, &link)?;

    let path = CString::new(link.as_os_str().as_bytes())
        .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    let fd = unsafe {
        libc::open(
            path.as_ptr(),
            libc::O_PATH | libc::O_NOFOLLOW | libc::O_CLOEXEC,
        )
    };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

static STALE_FD_SLOT: AtomicI32 = AtomicI32::new(700);

/// Produce an fd number that is no longer open.
///
/// The kernel recycles the lowest free fd number first, so the stale number
/// is parked in a high, per-call-unique slot where concurrent opens in the
/// test process cannot reuse it before the caller probes it.
pub fn stale_fd() -> io::Result<RawFd> {
    let file = File::open("/dev/null")?;
    let slot = STALE_FD_SLOT.fetch_add(1, Ordering::Relaxed);
    let rc = unsafe { libc::dup2(file.as_raw_fd(), slot) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    let rc = unsafe { libc::close(slot) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(slot)
}
