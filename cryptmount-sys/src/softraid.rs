// SPDX-License-Identifier: GPL-3.0-only

//! Softraid attachment detection from `bioctl softraid0`
//!
//! ```text
//! Volume      Status               Size Device
//! softraid0 0 Online      1000202665472 sd3     CRYPTO
//!           0 Online      1000202665472 0:0.0   noencl <sd2a>
//! ```
//!
//! A volume row names the logical disk in its fifth field and the RAID
//! level in its sixth. The chunk rows that follow it carry the physical
//! partition in angle brackets in their sixth field.

use cryptmount_types::{AttachmentState, DiskSpec};
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::Result;
use crate::probe::Probe;

const CRYPTO_LEVEL: &str = "CRYPTO";

/// Find the crypto volume whose chunk is `physical` (e.g. `sd2a`).
///
/// Only six-field rows are considered. A chunk matches the most recent
/// volume row before it; chunks of non-crypto volumes never match.
/// A volume row of any other RAID level (e.g. `RAID1`) ends the current
/// crypto group, so its chunks are not credited to the volume above it.
pub fn parse_status(report: &str, physical: &str) -> AttachmentState {
    let chunk = format!("<{physical}>");
    let mut volume: Option<&str> = None;

    for line in report.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[_, _, _, _, logical, sixth] = fields.as_slice() else {
            continue;
        };

        if sixth == CRYPTO_LEVEL {
            volume = Some(logical);
        } else if sixth == chunk {
            if let Some(logical) = volume {
                return AttachmentState::Attached {
                    logical_device: logical.to_string(),
                };
            }
        } else if !sixth.starts_with('<') {
            // volume row of another RAID level
            volume = None;
        }
    }

    AttachmentState::Unattached
}

impl<R: CommandRunner + ?Sized> Probe<'_, R> {
    /// Whether the physical partition is attached, and to which logical disk.
    ///
    /// A disk that is not plugged in cannot be attached, so the status
    /// command is not run at all in that case.
    pub fn attachment(&self, physical: &DiskSpec) -> Result<AttachmentState> {
        let Some(base) = self.resolve(physical.duid())? else {
            debug!("Physical disk {} is not present", physical);
            return Ok(AttachmentState::Unattached);
        };

        let report = self.query(&self.tools.softraid_status())?;
        let state = parse_status(&report, &physical.device_name(&base));
        debug!("Softraid state of {}: {:?}", physical, state);
        Ok(state)
    }
}
