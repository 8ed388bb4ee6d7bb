// SPDX-License-Identifier: GPL-3.0-only

use crate::DiskSpec;

/// Options passed to `mount` when none are configured
pub const DEFAULT_MOUNT_OPTIONS: &str = "-o softdep";

/// One attach-and-mount (or unmount-and-detach) job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Encrypted RAID partition on the physical disk
    pub physical: DiskSpec,

    /// Filesystem partition on the decrypted logical disk
    pub logical: DiskSpec,

    /// Directory the logical partition is mounted on
    pub target_dir: String,

    /// Option string for `mount`, split on whitespace (e.g. "-o softdep")
    pub mount_options: String,
}

impl MountRequest {
    pub fn new(physical: DiskSpec, logical: DiskSpec, target_dir: impl Into<String>) -> Self {
        Self {
            physical,
            logical,
            target_dir: target_dir.into(),
            mount_options: DEFAULT_MOUNT_OPTIONS.to_string(),
        }
    }

    pub fn with_mount_options(mut self, options: impl Into<String>) -> Self {
        self.mount_options = options.into();
        self
    }

    /// Mount options as separate arguments.
    pub fn mount_option_args(&self) -> Vec<String> {
        self.mount_options
            .split_whitespace()
            .map(ToString::to_string)
            .collect()
    }
}
