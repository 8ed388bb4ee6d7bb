// SPDX-License-Identifier: GPL-3.0-only

use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;
use crate::tools::Tools;

/// Read-only view of the system state
///
/// Every query runs the underlying command again; nothing is cached, since
/// disk names and attachments can change between calls. The queries are
/// implemented next to their report parsers in [`crate::disknames`],
/// [`crate::softraid`] and [`crate::mounts`].
pub struct Probe<'a, R: CommandRunner + ?Sized> {
    pub(crate) runner: &'a R,
    pub(crate) tools: &'a Tools,
}

impl<'a, R: CommandRunner + ?Sized> Probe<'a, R> {
    pub fn new(runner: &'a R, tools: &'a Tools) -> Self {
        Self { runner, tools }
    }

    pub(crate) fn query(&self, spec: &CommandSpec) -> Result<String> {
        self.runner.capture(spec)?.into_report()
    }
}
