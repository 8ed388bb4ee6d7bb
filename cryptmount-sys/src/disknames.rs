// SPDX-License-Identifier: GPL-3.0-only

//! DUID to kernel disk name resolution
//!
//! `sysctl hw.disknames` prints one line such as
//! `hw.disknames=sd0:e072adf1dcc1be16,cd0:,sd1:4a9f12a79235b9bd`.
//! Disks without a label (`cd0`) report an empty DUID.

use cryptmount_types::DiskSpec;
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::{Result, SysError};
use crate::probe::Probe;

/// Snapshot of the kernel's disk list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskNameTable {
    /// `(device, duid)` in report order
    entries: Vec<(String, String)>,
}

impl DiskNameTable {
    /// Parse a disk-name report. `command` is used in error messages only.
    pub fn parse(report: &str, command: &str) -> Result<Self> {
        let report = report.trim();
        let malformed = || SysError::MalformedReport {
            command: command.to_string(),
            report: report.to_string(),
        };

        let fields: Vec<&str> = report.split('=').collect();
        let [_, list] = fields.as_slice() else {
            return Err(malformed());
        };

        let entries = list
            .split(',')
            .map(|entry| match entry.split(':').collect::<Vec<_>>().as_slice() {
                [device, duid] => Ok((device.to_string(), duid.to_string())),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Kernel name of the disk with `duid`, or `None` when it is not attached.
    ///
    /// Two devices claiming the same DUID is an error rather than a guess.
    pub fn resolve(&self, duid: &str) -> Result<Option<&str>> {
        let mut matches = self
            .entries
            .iter()
            .filter(|(_, id)| id == duid)
            .map(|(device, _)| device.as_str());

        let Some(first) = matches.next() else {
            return Ok(None);
        };
        if let Some(second) = matches.next() {
            return Err(SysError::DuplicateDuid {
                duid: duid.to_string(),
                first: first.to_string(),
                second: second.to_string(),
            });
        }

        Ok(Some(first))
    }
}

impl<R: CommandRunner + ?Sized> Probe<'_, R> {
    /// Fresh disk-name table.
    pub fn disk_names(&self) -> Result<DiskNameTable> {
        let spec = self.tools.disknames();
        let report = self.query(&spec)?;
        DiskNameTable::parse(&report, &spec.to_string())
    }

    /// Kernel base name (e.g. `sd0`) of the disk with `duid`.
    pub fn resolve(&self, duid: &str) -> Result<Option<String>> {
        let table = self.disk_names()?;
        let device = table.resolve(duid)?.map(ToString::to_string);
        debug!("DUID {} resolves to {:?}", duid, device);
        Ok(device)
    }

    /// Device path (e.g. `/dev/sd0a`) of a disk spec, `None` when the disk
    /// is not present.
    pub fn locate(&self, disk: &DiskSpec) -> Result<Option<String>> {
        Ok(self
            .resolve(disk.duid())?
            .map(|base| disk.device_path(&base)))
    }

    /// Like [`Probe::locate`], but absence is an error.
    pub fn require(&self, disk: &DiskSpec) -> Result<String> {
        self.locate(disk)?
            .ok_or_else(|| SysError::DiskNotPresent(disk.clone()))
    }
}
