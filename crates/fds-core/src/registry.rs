//! Per-kind leak registries and the open-time kind index.
//!
//! One registry per tracked kind, each behind its own lock so kinds never
//! contend with each other. The kind index records which registry an fd
//! went into at open time; close routes through the index instead of
//! re-classifying, so a close can never target the wrong registry.
//!
//! Critical sections are O(1) map operations only. Classification,
//! timestamping, stack formatting, and log emission all happen outside
//! every lock.

use fds_common::{DescriptorRecord, ResourceKind, TRACKED_KIND_COUNT};
use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::sync::{Mutex, MutexGuard};

type Shelf = Mutex<HashMap<RawFd, DescriptorRecord>>;

/// What an insert did, for the caller's diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// An entry for the same fd already existed in this kind's registry
    /// and was overwritten (open-after-open without a close).
    pub overwrote: bool,
    /// The fd was previously tracked under a different kind; that stale
    /// entry has been evicted (fd number reused by the kernel).
    pub evicted: Option<ResourceKind>,
}

/// The registry set: four fd → record maps addressed by tracked kind,
/// plus the fd → kind index written at open and consulted at close.
#[derive(Debug, Default)]
pub struct RegistrySet {
    kinds: Mutex<HashMap<RawFd, ResourceKind>>,
    slots: [Shelf; TRACKED_KIND_COUNT],
}

// A poisoned lock only means another thread panicked mid-operation; the
// maps themselves are always structurally valid, so keep serving.
fn relock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RegistrySet {
    /// Create an empty registry set.
    pub fn new() -> Self {
        Self::default()
    }

    fn shelf(&self, kind: ResourceKind) -> Option<&Shelf> {
        let slot = kind.tracked_slot()?;
        Some(&self.slots[slot])
    }

    /// Insert (or overwrite) the record for `record.fd` under `kind`.
    ///
    /// Returns `None` if `kind` is not tracked; otherwise reports whether an
    /// existing entry was overwritten and whether a stale entry under a
    /// different kind was evicted.
    pub fn insert(&self, kind: ResourceKind, record: DescriptorRecord) -> Option<InsertOutcome> {
        let shelf = self.shelf(kind)?;
        let fd = record.fd;

        let prev_kind = relock(&self.kinds).insert(fd, kind);

        let evicted = match prev_kind {
            Some(old) if old != kind => self
                .shelf(old)
                .and_then(|old_shelf| relock(old_shelf).remove(&fd))
                .map(|_| old),
            _ => None,
        };

        let overwrote = relock(shelf).insert(fd, record).is_some();

        Some(InsertOutcome { overwrote, evicted })
    }

    /// Remove the record for `fd`, routed through the kind index.
    ///
    /// A miss (fd never tracked, or already removed) returns `None`.
    pub fn remove(&self, fd: RawFd) -> Option<(ResourceKind, DescriptorRecord)> {
        let kind = relock(&self.kinds).remove(&fd)?;
        let shelf = self.shelf(kind)?;
        let record = relock(shelf).remove(&fd)?;
        Some((kind, record))
    }

    /// Copy of one registry's current entries, sorted by fd.
    ///
    /// The copy is taken under that registry's lock, so it reflects a state
    /// that actually existed. Untracked kinds yield an empty vec.
    pub fn snapshot(&self, kind: ResourceKind) -> Vec<DescriptorRecord> {
        let mut records: Vec<DescriptorRecord> = match self.shelf(kind) {
            Some(shelf) => relock(shelf).values().cloned().collect(),
            None => Vec::new(),
        };
        records.sort_by_key(|r| r.fd);
        records
    }

    /// Number of live entries for one kind.
    pub fn len(&self, kind: ResourceKind) -> usize {
        match self.shelf(kind) {
            Some(shelf) => relock(shelf).len(),
            None => 0,
        }
    }

    /// Number of live entries across all kinds.
    pub fn total(&self) -> usize {
        self.slots.iter().map(|shelf| relock(shelf).len()).sum()
    }

    /// Whether every registry is empty.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
