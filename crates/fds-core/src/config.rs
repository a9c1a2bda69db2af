//! Collector configuration.
//!
//! Supports configuration via:
//! - Environment variables (FDS_TRACK, FDS_MAX_STACK_BYTES)
//! - Programmatic `with_*` builders

use fds_common::ResourceKind;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default cap on stored stack text, in bytes.
pub const DEFAULT_MAX_STACK_BYTES: usize = 16 * 1024;

/// Collector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Track FIFO / pipe descriptors.
    pub track_named_pipes: bool,
    /// Track character device descriptors.
    pub track_character_devices: bool,
    /// Track regular file descriptors.
    pub track_regular_files: bool,
    /// Track socket descriptors.
    pub track_sockets: bool,
    /// Cap on stored stack text in bytes; 0 disables truncation.
    pub max_stack_bytes: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            track_named_pipes: true,
            track_character_devices: true,
            track_regular_files: true,
            track_sockets: true,
            max_stack_bytes: DEFAULT_MAX_STACK_BYTES,
        }
    }
}

impl CollectorConfig {
    /// Create config from environment variables.
    ///
    /// `FDS_TRACK` is a comma-separated list of kind names (e.g.
    /// `"socket,regular_file"`); when set, only the listed kinds are
    /// tracked. Unknown names are logged and skipped; if nothing in the
    /// list parses, the default (track everything) is kept.
    /// `FDS_MAX_STACK_BYTES` overrides the stack cap.
    pub fn from_env() -> Self {
        let mut config = CollectorConfig::default();

        if let Ok(val) = std::env::var("FDS_TRACK") {
            let mut selected = Vec::new();
            for name in val.split(',') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                match parse_kind_name(name) {
                    Some(kind) => selected.push(kind),
                    None => warn!(name, "unknown kind name in FDS_TRACK, skipping"),
                }
            }
            if !selected.is_empty() {
                config.track_named_pipes = selected.contains(&ResourceKind::NamedPipe);
                config.track_character_devices =
                    selected.contains(&ResourceKind::CharacterDevice);
                config.track_regular_files = selected.contains(&ResourceKind::RegularFile);
                config.track_sockets = selected.contains(&ResourceKind::Socket);
            }
        }

        if let Ok(val) = std::env::var("FDS_MAX_STACK_BYTES") {
            match val.parse::<usize>() {
                Ok(bytes) => config.max_stack_bytes = bytes,
                Err(_) => warn!(value = %val, "invalid FDS_MAX_STACK_BYTES, keeping default"),
            }
        }

        config
    }

    /// Whether events for `kind` should be recorded.
    pub fn tracks(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::NamedPipe => self.track_named_pipes,
            ResourceKind::CharacterDevice => self.track_character_devices,
            ResourceKind::RegularFile => self.track_regular_files,
            ResourceKind::Socket => self.track_sockets,
            _ => false,
        }
    }

    /// Whether every tracked kind is disabled.
    pub fn tracks_nothing(&self) -> bool {
        ResourceKind::tracked().iter().all(|kind| !self.tracks(*kind))
    }

    /// Clamp stack text to `max_stack_bytes`, marking the cut.
    pub fn clamp_stack(&self, stack: &str) -> String {
        if self.max_stack_bytes == 0 || stack.len() <= self.max_stack_bytes {
            return stack.to_string();
        }
        let mut end = self.max_stack_bytes;
        while !stack.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...(truncated)", &stack[..end])
    }

    /// Enable or disable tracking for one kind.
    pub fn with_kind(mut self, kind: ResourceKind, enabled: bool) -> Self {
        match kind {
            ResourceKind::NamedPipe => self.track_named_pipes = enabled,
            ResourceKind::CharacterDevice => self.track_character_devices = enabled,
            ResourceKind::RegularFile => self.track_regular_files = enabled,
            ResourceKind::Socket => self.track_sockets = enabled,
            _ => {}
        }
        self
    }

    /// Set the stack cap.
    pub fn with_max_stack_bytes(mut self, bytes: usize) -> Self {
        self.max_stack_bytes = bytes;
        self
    }
}

/// Parse a kind name as accepted by `FDS_TRACK`.
fn parse_kind_name(name: &str) -> Option<ResourceKind> {
    match name.to_lowercase().as_str() {
        "named_pipe" | "pipe" | "fifo" => Some(ResourceKind::NamedPipe),
        "character_device" | "chardev" | "char" => Some(ResourceKind::CharacterDevice),
        "regular_file" | "file" => Some(ResourceKind::RegularFile),
        "socket" | "sock" => Some(ResourceKind::Socket),
        _ => None,
    }
}
