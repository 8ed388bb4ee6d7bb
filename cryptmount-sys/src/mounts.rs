// SPDX-License-Identifier: GPL-3.0-only

//! Mount table lookups
//!
//! `mount` without arguments prints one line per filesystem:
//! `/dev/sd1l on /home type ffs (local, nodev, nosuid, softdep)`.

use cryptmount_types::{DiskSpec, MountState};
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::Result;
use crate::probe::Probe;

/// Whether the mount table lists `device_path` mounted on `dir`.
///
/// Lines must start with `"<device_path> on <dir>"` followed by a space or
/// the end of the line, so `/backup` does not match `/backup2`.
pub fn is_listed(table: &str, device_path: &str, dir: &str) -> bool {
    let prefix = format!("{device_path} on {}", normalize_dir(dir));

    table.lines().any(|line| {
        line.strip_prefix(&prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    })
}

/// `mount` prints mount points without a trailing slash.
fn normalize_dir(dir: &str) -> &str {
    match dir.trim_end_matches('/') {
        "" if dir.starts_with('/') => "/",
        trimmed => trimmed,
    }
}

impl<R: CommandRunner + ?Sized> Probe<'_, R> {
    /// Mount state of the logical partition on `dir`. A partition that does
    /// not exist yet is reported unmounted without reading the mount table.
    pub fn mount_state(&self, logical: &DiskSpec, dir: &str) -> Result<MountState> {
        let Some(device_path) = self.locate(logical)? else {
            debug!("Logical disk {} is not present", logical);
            return Ok(MountState::Unmounted);
        };

        let table = self.query(&self.tools.mount_table())?;
        let state = MountState::from(is_listed(&table, &device_path, dir));
        debug!("{} on {}: {:?}", device_path, dir, state);
        Ok(state)
    }
}
