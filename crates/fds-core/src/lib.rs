//! FD Sentry core library.
//!
//! This library maintains the live set of tracked file descriptors for
//! leak detection:
//! - Classification of fds into resource kinds via kernel metadata
//! - Per-kind leak registries with an open-time kind index
//! - A collector façade receiving open/close events from an
//!   instrumentation layer
//! - Snapshot accessors and a structured leak report for the host tool
//!
//! The collector is an in-process library boundary: no CLI, no wire
//! protocol. Events arrive inline on whichever application thread performed
//! the underlying syscall, so everything here is safe for concurrent use.

pub mod classify;
pub mod collector;
pub mod config;
pub mod keyed;
pub mod logging;
pub mod registry;
pub mod report;

// Re-export real-resource helpers for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use collector::Collector;
pub use config::CollectorConfig;
pub use fds_common::{DescriptorRecord, Error, ErrorCategory, ResourceKind, Result};
pub use report::LeakReport;
