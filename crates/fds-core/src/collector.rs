//! The collector façade: open/close event sink and snapshot surface.
//!
//! One collector instance per process, constructed at attach time and
//! handed to the interception layer. Events are fire-and-forget: nothing
//! here returns an error to the caller, and a dropped event only means a
//! missing or stale entry in the eventual leak report.

use crate::classify::classify;
use crate::config::CollectorConfig;
use crate::keyed::{KeyedRecord, KeyedRegistry};
use crate::logging::{event_names, generate_collector_id};
use crate::registry::RegistrySet;
use crate::report::LeakReport;
use fds_common::{DescriptorRecord, ResourceKind};
use std::os::unix::io::RawFd;
use tracing::{debug, info, trace};

/// Tracks currently-open fds for leak detection.
///
/// Safe to share across threads; `on_open` / `on_close` run inline on the
/// calling thread and complete in microseconds. Classification happens
/// outside every registry lock.
#[derive(Debug)]
pub struct Collector {
    id: String,
    config: CollectorConfig,
    registries: RegistrySet,
    keyed: KeyedRegistry,
}

impl Collector {
    /// Create a collector with the given configuration.
    pub fn new(config: CollectorConfig) -> Self {
        let id = generate_collector_id();
        info!(
            target: event_names::COLLECTOR_ATTACHED,
            collector_id = %id,
            max_stack_bytes = config.max_stack_bytes,
            "fd collector attached"
        );
        Collector {
            id,
            config,
            registries: RegistrySet::new(),
            keyed: KeyedRegistry::new(),
        }
    }

    /// Create a collector with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// Collector instance id, for log correlation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The active configuration.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Record an opened fd with the stack captured at the open site.
    ///
    /// `fd` must be valid at call time. Classification failures and
    /// untracked kinds drop the event; a tracked kind inserts a record,
    /// overwriting any pre-existing entry for the same fd.
    pub fn on_open(&self, fd: RawFd, stack: &str) {
        if self.config.tracks_nothing() {
            return;
        }

        let kind = match classify(fd) {
            Ok(kind) => kind,
            Err(err) => {
                debug!(
                    target: event_names::OPEN_CLASSIFY_FAILED,
                    fd,
                    error = %err,
                    "dropping open event"
                );
                return;
            }
        };

        if !kind.is_tracked() {
            trace!(
                target: event_names::OPEN_UNTRACKED,
                fd,
                kind = %kind,
                "ignoring untracked kind"
            );
            return;
        }
        if !self.config.tracks(kind) {
            trace!(
                target: event_names::OPEN_DISABLED,
                fd,
                kind = %kind,
                "kind disabled by config"
            );
            return;
        }

        let record = DescriptorRecord::new(fd, self.config.clamp_stack(stack));
        if let Some(outcome) = self.registries.insert(kind, record) {
            if let Some(old_kind) = outcome.evicted {
                debug!(
                    target: event_names::OPEN_EVICTED_STALE,
                    fd,
                    old_kind = %old_kind,
                    new_kind = %kind,
                    "evicted stale entry for reused fd"
                );
            }
            debug!(
                target: event_names::OPEN_TRACKED,
                fd,
                kind = %kind,
                overwrote = outcome.overwrote,
                "tracked open"
            );
        }
    }

    /// Record a closed fd.
    ///
    /// Removal routes through the kind recorded at open time; no
    /// classification syscall happens here, so the fd's OS-level state at
    /// close time cannot misroute the removal. A miss (fd never tracked,
    /// opened before attach, or already removed) is a silent no-op.
    pub fn on_close(&self, fd: RawFd) {
        match self.registries.remove(fd) {
            Some((kind, _record)) => {
                debug!(
                    target: event_names::CLOSE_REMOVED,
                    fd,
                    kind = %kind,
                    "close removed tracked entry"
                );
            }
            None => {
                trace!(target: event_names::CLOSE_MISS, fd, "close for untracked fd");
            }
        }
    }

    /// Record an opened resource identified by an opaque key.
    ///
    /// The keyed path carries no kind classification and shares no storage
    /// with the fd path; see [`crate::keyed`].
    pub fn on_keyed_open(&self, key: &str, stack: &str) {
        let overwrote = self.keyed.insert(key, self.config.clamp_stack(stack));
        debug!(target: event_names::KEYED_OPEN, key, overwrote, "tracked keyed open");
    }

    /// Record a closed resource identified by an opaque key.
    pub fn on_keyed_close(&self, key: &str) {
        match self.keyed.remove(key) {
            Some(_) => debug!(target: event_names::KEYED_CLOSE, key, "keyed close removed entry"),
            None => trace!(target: event_names::KEYED_CLOSE_MISS, key, "keyed close miss"),
        }
    }

    /// Current entries for one kind, a consistent copy.
    pub fn snapshot(&self, kind: ResourceKind) -> Vec<DescriptorRecord> {
        self.registries.snapshot(kind)
    }

    /// Current entries for every tracked kind.
    pub fn snapshot_all(&self) -> Vec<(ResourceKind, Vec<DescriptorRecord>)> {
        ResourceKind::tracked()
            .iter()
            .map(|kind| (*kind, self.registries.snapshot(*kind)))
            .collect()
    }

    /// Current entries of the keyed path, a consistent copy.
    pub fn keyed_snapshot(&self) -> Vec<(String, KeyedRecord)> {
        self.keyed.snapshot()
    }

    /// Number of live tracked fds for one kind.
    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.registries.len(kind)
    }

    /// Number of live tracked fds across all kinds.
    pub fn live_total(&self) -> usize {
        self.registries.total()
    }

    /// Build a structured leak report from the current registries.
    pub fn leak_report(&self) -> LeakReport {
        let report = LeakReport::build(&self.id, self.snapshot_all());
        info!(
            target: event_names::REPORT_GENERATED,
            collector_id = %self.id,
            total = report.total,
            "leak report generated"
        );
        report
    }
}
