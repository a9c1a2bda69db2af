//! Resource kind taxonomy for file descriptor classification.
//!
//! Kinds are derived deterministically from the `S_IFMT` bits of an fd's
//! stat metadata. Four kinds are tracked for leak detection; the rest are
//! observed during classification but never persisted in a registry.

use serde::{Deserialize, Serialize};

/// Number of kinds that get a dedicated registry.
pub const TRACKED_KIND_COUNT: usize = 4;

/// The kind of kernel object a file descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// FIFO / named pipe (also anonymous pipe ends).
    NamedPipe,
    /// Character device (tty, /dev/null, ...).
    CharacterDevice,
    /// Regular file.
    RegularFile,
    /// Socket (TCP, UDP, Unix).
    Socket,
    /// Directory.
    Directory,
    /// Block device.
    BlockDevice,
    /// Symbolic link (only reachable via O_PATH descriptors).
    SymbolicLink,
    /// Unrecognized file-type bits.
    Unknown,
}

impl ResourceKind {
    /// All kind variants in stable order.
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::NamedPipe,
            ResourceKind::CharacterDevice,
            ResourceKind::RegularFile,
            ResourceKind::Socket,
            ResourceKind::Directory,
            ResourceKind::BlockDevice,
            ResourceKind::SymbolicLink,
            ResourceKind::Unknown,
        ]
    }

    /// The kinds that get a dedicated leak registry, in registry-slot order.
    pub fn tracked() -> &'static [ResourceKind] {
        &[
            ResourceKind::NamedPipe,
            ResourceKind::CharacterDevice,
            ResourceKind::RegularFile,
            ResourceKind::Socket,
        ]
    }

    /// Registry slot for this kind, or `None` if the kind is not tracked.
    ///
    /// Insert and remove both route through this one table, so a kind can
    /// never map to different registries on the two paths.
    pub fn tracked_slot(&self) -> Option<usize> {
        match self {
            ResourceKind::NamedPipe => Some(0),
            ResourceKind::CharacterDevice => Some(1),
            ResourceKind::RegularFile => Some(2),
            ResourceKind::Socket => Some(3),
            _ => None,
        }
    }

    /// Whether a registry exists for this kind.
    pub fn is_tracked(&self) -> bool {
        self.tracked_slot().is_some()
    }

    /// Kind from a registry slot index.
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::tracked().get(slot).copied()
    }

    /// Stable machine-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::NamedPipe => "named_pipe",
            ResourceKind::CharacterDevice => "character_device",
            ResourceKind::RegularFile => "regular_file",
            ResourceKind::Socket => "socket",
            ResourceKind::Directory => "directory",
            ResourceKind::BlockDevice => "block_device",
            ResourceKind::SymbolicLink => "symbolic_link",
            ResourceKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
