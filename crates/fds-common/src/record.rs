//! Descriptor records held by the leak registries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::os::unix::io::RawFd;

/// One currently-open, tracked resource.
///
/// The fd value is only meaningful while the resource is open; the kernel
/// may reuse the number after close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorRecord {
    /// File descriptor number.
    pub fd: RawFd,
    /// Call stack captured at open time, pre-formatted by the caller.
    pub stack: String,
    /// When the open event was observed.
    pub opened_at: DateTime<Utc>,
}

impl DescriptorRecord {
    /// Create a record stamped with the current time.
    pub fn new(fd: RawFd, stack: impl Into<String>) -> Self {
        DescriptorRecord {
            fd,
            stack: stack.into(),
            opened_at: Utc::now(),
        }
    }

    /// Stable hashed signature of the open-site stack.
    ///
    /// Identical stacks produce identical signatures, so leaks from the same
    /// open site can be grouped in a report. Format: `stack:` + 16 hex chars.
    pub fn stack_signature(&self) -> String {
        signature_of(&self.stack)
    }
}

/// Compute the stack signature for an arbitrary stack string.
pub fn signature_of(stack: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stack.as_bytes());
    let hash = hasher.finalize();
    format!("stack:{}", hex::encode(&hash[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new_stamps_time() {
        let before = Utc::now();
        let record = DescriptorRecord::new(42, "open\nread");
        let after = Utc::now();
        assert_eq!(record.fd, 42);
        assert_eq!(record.stack, "open\nread");
        assert!(record.opened_at >= before && record.opened_at <= after);
    }

    #[test]
    fn test_signature_is_stable() {
        let a = DescriptorRecord::new(1, "alpha");
        let b = DescriptorRecord::new(99, "alpha");
        assert_eq!(a.stack_signature(), b.stack_signature());
    }

    #[test]
    fn test_signature_distinguishes_stacks() {
        assert_ne!(signature_of("alpha"), signature_of("beta"));
    }

    #[test]
    fn test_signature_format() {
        let sig = signature_of("main -> open");
        assert!(sig.starts_with("stack:"));
        assert_eq!(sig.len(), "stack:".len() + 16);
    }

    #[test]
    fn test_record_serializes() {
        let record = DescriptorRecord::new(7, "socket()");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"fd\":7"));
        assert!(json.contains("\"stack\":\"socket()\""));
        assert!(json.contains("\"opened_at\""));
    }
}
