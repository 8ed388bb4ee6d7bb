// SPDX-License-Identifier: GPL-3.0-only

//! Observed state and the stage model for a physical/logical disk pair
//!
//! ```text
//!   Unattached --attach--> Attached --check--> Checked --mount--> Mounted
//!   Unattached <--detach-- Attached <------------unmount--------- Mounted
//! ```
//!
//! Stages are passed in order in both directions. A checked but unmounted
//! filesystem may also be detached directly, since checking leaves nothing
//! to undo.

use std::fmt;
use thiserror::Error;

/// Whether a physical partition is attached to the crypto controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentState {
    Unattached,
    /// Attached; `logical_device` is the decrypted disk, e.g. `sd3`
    Attached { logical_device: String },
}

impl AttachmentState {
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached { .. })
    }

    pub fn logical_device(&self) -> Option<&str> {
        match self {
            Self::Attached { logical_device } => Some(logical_device),
            Self::Unattached => None,
        }
    }
}

/// Whether the logical partition is mounted on the target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Unmounted,
    Mounted,
}

impl MountState {
    pub fn is_mounted(self) -> bool {
        self == Self::Mounted
    }
}

impl From<bool> for MountState {
    fn from(mounted: bool) -> Self {
        if mounted { Self::Mounted } else { Self::Unmounted }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Unattached,
    Attached,
    Checked,
    Mounted,
}

impl Stage {
    /// Stage implied by a fresh observation of the system.
    ///
    /// `Checked` is never observed: it only exists between a successful
    /// check and the mount that follows it.
    pub fn observed(attachment: &AttachmentState, mount: MountState) -> Self {
        match (attachment.is_attached(), mount) {
            (_, MountState::Mounted) => Self::Mounted,
            (true, MountState::Unmounted) => Self::Attached,
            (false, MountState::Unmounted) => Self::Unattached,
        }
    }

    /// Next step towards `Mounted`, `None` once there.
    pub fn mount_step(self) -> Option<Transition> {
        match self {
            Self::Unattached => Some(Transition::Attach),
            Self::Attached => Some(Transition::Check),
            Self::Checked => Some(Transition::Mount),
            Self::Mounted => None,
        }
    }

    /// Next step towards `Unattached`, `None` once there.
    pub fn unmount_step(self) -> Option<Transition> {
        match self {
            Self::Mounted => Some(Transition::Unmount),
            Self::Attached | Self::Checked => Some(Transition::Detach),
            Self::Unattached => None,
        }
    }

    /// Stage reached by performing `transition` from this stage.
    pub fn apply(self, transition: Transition) -> Result<Self, IllegalTransition> {
        use Stage::*;
        use Transition::*;

        match (self, transition) {
            (Unattached, Attach) => Ok(Attached),
            (Attached, Check) => Ok(Checked),
            (Checked, Mount) => Ok(Mounted),
            (Mounted, Unmount) => Ok(Attached),
            (Attached | Checked, Detach) => Ok(Unattached),
            (from, transition) => Err(IllegalTransition { from, transition }),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unattached => "unattached",
            Self::Attached => "attached",
            Self::Checked => "checked",
            Self::Mounted => "mounted",
        };
        f.write_str(name)
    }
}

/// An operation that moves a disk pair between stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Attach,
    Check,
    Mount,
    Unmount,
    Detach,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attach => "attach softraid",
            Self::Check => "fsck",
            Self::Mount => "mount filesystem",
            Self::Unmount => "unmount filesystem",
            Self::Detach => "detach softraid",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {transition} while {from}")]
pub struct IllegalTransition {
    pub from: Stage,
    pub transition: Transition,
}
