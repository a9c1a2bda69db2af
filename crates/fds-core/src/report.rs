//! Structured leak report built from registry snapshots.
//!
//! The reporting component that displays or uploads the report lives
//! outside this library; this module only assembles the data it consumes.
//! Surviving records are grouped by kind, then by open-site stack
//! signature, so a hundred leaks from one call site read as one group.

use chrono::{DateTime, Utc};
use fds_common::{DescriptorRecord, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::os::unix::io::RawFd;

/// Leaked descriptors sharing one open-site stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakGroup {
    /// Stable stack signature (`stack:` + 16 hex).
    pub signature: String,
    /// Number of leaked fds in this group.
    pub count: usize,
    /// The leaked fd numbers, sorted.
    pub fds: Vec<RawFd>,
    /// The shared open-site stack text.
    pub stack: String,
}

/// Leaks of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
    /// The resource kind.
    pub kind: ResourceKind,
    /// Number of leaked fds of this kind.
    pub count: usize,
    /// Groups ordered by signature.
    pub groups: Vec<LeakGroup>,
}

/// Snapshot of every surviving record, grouped for human consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The collector instance the report came from.
    pub collector_id: String,
    /// Total leaked fds across all kinds.
    pub total: usize,
    /// Per-kind breakdown; kinds with no leaks are omitted.
    pub kinds: Vec<KindReport>,
}

impl LeakReport {
    /// Assemble a report from per-kind snapshots.
    pub fn build(
        collector_id: &str,
        snapshots: Vec<(ResourceKind, Vec<DescriptorRecord>)>,
    ) -> Self {
        let mut kinds = Vec::new();
        let mut total = 0;

        for (kind, records) in snapshots {
            if records.is_empty() {
                continue;
            }
            total += records.len();
            kinds.push(KindReport {
                kind,
                count: records.len(),
                groups: group_by_signature(records),
            });
        }

        LeakReport {
            generated_at: Utc::now(),
            collector_id: collector_id.to_string(),
            total,
            kinds,
        }
    }

    /// Whether any leak survived.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"collector_id":"{}","error":"serialization_failed"}}"#,
                self.collector_id
            )
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

fn group_by_signature(records: Vec<DescriptorRecord>) -> Vec<LeakGroup> {
    let mut groups: BTreeMap<String, LeakGroup> = BTreeMap::new();

    for record in records {
        let signature = record.stack_signature();
        groups
            .entry(signature.clone())
            .or_insert_with(|| LeakGroup {
                signature,
                count: 0,
                fds: Vec::new(),
                stack: record.stack.clone(),
            })
            .add(record.fd);
    }

    groups.into_values().collect()
}

impl LeakGroup {
    fn add(&mut self, fd: RawFd) {
        self.count += 1;
        self.fds.push(fd);
        self.fds.sort_unstable();
    }
}
