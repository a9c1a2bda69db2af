//! FD Sentry common types and errors.
//!
//! This crate provides the foundational types shared across fds-core modules:
//! - Resource kind taxonomy derived from kernel file-type bits
//! - Descriptor records with open-site stack signatures
//! - Common error types

pub mod error;
pub mod kind;
pub mod record;

pub use error::{Error, ErrorCategory, Result};
pub use kind::{ResourceKind, TRACKED_KIND_COUNT};
pub use record::DescriptorRecord;
