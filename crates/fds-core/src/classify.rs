//! File descriptor classification via kernel metadata.
//!
//! Classification is a pure query: two syscalls, no shared state, no locks.
//! It is safe to call concurrently from any thread and must never run inside
//! a registry lock.

use fds_common::{Error, ResourceKind, Result};
use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;

/// Determine the resource kind of an open file descriptor.
///
/// Probes liveness first with `fcntl(F_GETFD)` so a stale or closed fd
/// surfaces as [`Error::StaleDescriptor`] rather than a bogus `Unknown`
/// kind, then reads the file-type bits from `fstat`.
///
/// # Errors
/// [`Error::StaleDescriptor`] if the fd is not open at the OS level;
/// [`Error::MetadataQuery`] if the stat query itself fails.
pub fn classify(fd: RawFd) -> Result<ResourceKind> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 {
        return Err(Error::StaleDescriptor {
            fd,
            source: std::io::Error::last_os_error(),
        });
    }

    let mut stat = MaybeUninit::<libc::stat>::uninit();
    let rc = unsafe { libc::fstat(fd, stat.as_mut_ptr()) };
    if rc < 0 {
        return Err(Error::MetadataQuery {
            fd,
            source: std::io::Error::last_os_error(),
        });
    }
    let stat = unsafe { stat.assume_init() };

    Ok(kind_from_mode(stat.st_mode))
}

/// Map `st_mode` file-type bits to a resource kind (pure, for testing).
pub fn kind_from_mode(mode: libc::mode_t) -> ResourceKind {
    match mode & libc::S_IFMT {
        libc::S_IFIFO => ResourceKind::NamedPipe,
        libc::S_IFCHR => ResourceKind::CharacterDevice,
        libc::S_IFREG => ResourceKind::RegularFile,
        libc::S_IFSOCK => ResourceKind::Socket,
        libc::S_IFDIR => ResourceKind::Directory,
        libc::S_IFBLK => ResourceKind::BlockDevice,
        libc::S_IFLNK => ResourceKind::SymbolicLink,
        _ => ResourceKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn test_kind_from_mode_table() {
        assert_eq!(kind_from_mode(libc::S_IFIFO), ResourceKind::NamedPipe);
        assert_eq!(kind_from_mode(libc::S_IFCHR), ResourceKind::CharacterDevice);
        assert_eq!(kind_from_mode(libc::S_IFREG), ResourceKind::RegularFile);
        assert_eq!(kind_from_mode(libc::S_IFSOCK), ResourceKind::Socket);
        assert_eq!(kind_from_mode(libc::S_IFDIR), ResourceKind::Directory);
        assert_eq!(kind_from_mode(libc::S_IFBLK), ResourceKind::BlockDevice);
        assert_eq!(kind_from_mode(libc::S_IFLNK), ResourceKind::SymbolicLink);
    }

    #[test]
    fn test_kind_from_mode_unknown_bits() {
        assert_eq!(kind_from_mode(0), ResourceKind::Unknown);
    }

    #[test]
    fn test_kind_from_mode_ignores_permission_bits() {
        assert_eq!(
            kind_from_mode(libc::S_IFREG | 0o644),
            ResourceKind::RegularFile
        );
    }

    #[test]
    fn test_classify_regular_file() {
        let file = test_utils::open_temp_file().expect("tempfile");
        let kind = classify(file.as_file().as_raw_fd()).expect("classify");
        assert_eq!(kind, ResourceKind::RegularFile);
    }

    #[test]
    fn test_classify_socket() {
        let (a, b) = test_utils::open_socket_pair().expect("socketpair");
        assert_eq!(classify(a.as_raw_fd()).unwrap(), ResourceKind::Socket);
        assert_eq!(classify(b.as_raw_fd()).unwrap(), ResourceKind::Socket);
    }

    #[test]
    fn test_classify_pipe() {
        let pipe = test_utils::open_pipe().expect("pipe");
        assert_eq!(
            classify(pipe.read.as_raw_fd()).unwrap(),
            ResourceKind::NamedPipe
        );
        assert_eq!(
            classify(pipe.write.as_raw_fd()).unwrap(),
            ResourceKind::NamedPipe
        );
    }

    #[test]
    fn test_classify_char_device() {
        let dev = test_utils::open_char_device().expect("/dev/null");
        assert_eq!(
            classify(dev.as_raw_fd()).unwrap(),
            ResourceKind::CharacterDevice
        );
    }

    #[test]
    fn test_classify_directory() {
        let dir = test_utils::open_directory().expect("dir");
        assert_eq!(classify(dir.as_raw_fd()).unwrap(), ResourceKind::Directory);
    }

    #[test]
    fn test_classify_symlink() {
        let dir = tempfile::tempdir().expect("tempdir");
        let link = test_utils::open_symlink(dir.path()).expect("symlink");
        assert_eq!(
            classify(link.as_raw_fd()).unwrap(),
            ResourceKind::SymbolicLink
        );
    }

    #[test]
    fn test_classify_stale_fd_is_error_not_unknown() {
        let fd = test_utils::stale_fd().expect("stale fd");
        match classify(fd) {
            Err(Error::StaleDescriptor { fd: seen, .. }) => assert_eq!(seen, fd),
            other => panic!("expected StaleDescriptor, got {:?}", other.map(|k| k.name())),
        }
    }

    #[test]
    fn test_classify_negative_fd() {
        assert!(matches!(
            classify(-1),
            Err(Error::StaleDescriptor { .. })
        ));
    }
}
