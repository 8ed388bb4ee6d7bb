// SPDX-License-Identifier: GPL-3.0-only

//! Shared data types for cryptmount
//!
//! Types describing what the operator asked for (`DiskSpec`, `MountRequest`)
//! and what the system currently looks like (`AttachmentState`,
//! `MountState`, `Stage`). Nothing here is persisted: every invocation
//! builds these values from arguments and fresh system queries.

pub mod disk;
pub mod request;
pub mod state;

pub use disk::{DUID_LEN, DiskSpec, DiskSpecError};
pub use request::{DEFAULT_MOUNT_OPTIONS, MountRequest};
pub use state::{AttachmentState, IllegalTransition, MountState, Stage, Transition};
