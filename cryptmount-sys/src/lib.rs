// SPDX-License-Identifier: GPL-3.0-only

//! System operations for attaching and mounting softraid crypto volumes
//!
//! This crate turns a [`MountRequest`](cryptmount_types::MountRequest) into
//! the sequence of OpenBSD commands that attaches the encrypted partition,
//! checks and mounts the decrypted filesystem, and the reverse. Current
//! state is always read back from the system:
//! - `sysctl hw.disknames` maps DUIDs to kernel disk names
//! - `bioctl softraid0` reports which partitions are attached
//! - `mount` lists mounted filesystems
//!
//! Every command goes through the [`CommandRunner`] seam so the parsers and
//! the orchestrator can be driven from canned reports in tests.

pub mod command;
pub mod disknames;
pub mod error;
pub mod mounts;
pub mod orchestrator;
pub mod probe;
pub mod softraid;
pub mod tools;

pub use command::{CommandOutcome, CommandRunner, CommandSpec, CommandStatus, SystemRunner};
pub use disknames::DiskNameTable;
pub use error::{Result, SysError};
pub use orchestrator::{Orchestrator, SequenceOutcome};
pub use probe::Probe;
pub use tools::Tools;
